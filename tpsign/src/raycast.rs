use color_eyre::eyre::Error;
use nalgebra::{
    Point3,
    Vector3,
};
use tpsign_command::{
    BlockPos,
    Dimension,
};

use crate::{
    config::RaycastConfig,
    server::{
        MinecraftServer,
        block_data,
    },
};

/// View angles in degrees, as stored in the player's `Rotation` tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub yaw: f64,
    pub pitch: f64,
}

impl Rotation {
    /// Unit look vector. Yaw 0 faces +z, yaw 90 faces -x, and positive pitch looks down.
    pub fn direction(&self) -> Vector3<f64> {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        Vector3::new(
            -yaw.sin() * pitch.cos(),
            -pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ViewRay {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
    pub max_steps: u32,
}

impl ViewRay {
    /// The ray from the eyes of a player standing at `position`.
    pub fn new(position: Point3<f64>, rotation: Rotation, config: &RaycastConfig) -> Self {
        Self {
            origin: position + Vector3::y() * config.eye_height,
            direction: rotation.direction(),
            max_steps: config.max_distance,
        }
    }

    /// Block containing the point `step` units along the ray.
    pub fn voxel(&self, step: u32) -> BlockPos {
        let point = self.origin + self.direction * f64::from(step);
        BlockPos::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    pub fn voxels(&self) -> impl Iterator<Item = BlockPos> + '_ {
        (0..self.max_steps).map(|step| self.voxel(step))
    }
}

/// Walks along `ray` and returns the first block whose block entity id is `sign_id`.
///
/// Issues one query per step and stops at the first match. Running out of steps is not an error.
pub async fn locate_sign<S>(
    server: &mut S,
    ray: &ViewRay,
    dimension: Dimension,
    sign_id: &str,
) -> Result<Option<BlockPos>, Error>
where
    S: MinecraftServer,
{
    for (step, position) in ray.voxels().enumerate() {
        let Some(block) = block_data(server, dimension, position).await?
        else {
            continue;
        };

        tracing::debug!(step, %position, id = block.id, "probed block entity");

        if block.id == sign_id {
            return Ok(Some(position));
        }
    }

    Ok(None)
}
