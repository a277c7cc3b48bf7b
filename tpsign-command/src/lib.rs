pub mod parse;

use std::str::FromStr;

pub use crate::parse::{
    SyntaxError,
    parse_command,
};

/// Integer block coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{x} {y} {z}")]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// The dimensions a teleport sign can point into.
///
/// `Display` renders the namespaced resource location, which is what server commands expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Dimension {
    #[display("minecraft:overworld")]
    Overworld,
    #[display("minecraft:the_nether")]
    TheNether,
    #[display("minecraft:the_end")]
    TheEnd,
}

impl Dimension {
    pub const ALL: [Self; 3] = [Self::Overworld, Self::TheNether, Self::TheEnd];

    /// The literal accepted by the command grammar.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::TheNether => "the_nether",
            Self::TheEnd => "the_end",
        }
    }

    /// Parses a resource location like `minecraft:the_end`. The namespace is optional.
    pub fn from_resource_location(s: &str) -> Result<Self, UnknownDimension> {
        s.strip_prefix("minecraft:")
            .unwrap_or(s)
            .parse()
            .map_err(|_| UnknownDimension(s.to_owned()))
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dimension| dimension.as_str() == s)
            .ok_or_else(|| UnknownDimension(s.to_owned()))
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("Unknown dimension: {0}")]
pub struct UnknownDimension(pub String);

/// A parsed `<x> <y> <z> <dimension> <remark>` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub destination: BlockPos,
    pub dimension: Dimension,
    pub remark: String,
}

impl FromStr for ParsedCommand {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s).map(|(command, _read)| command)
    }
}
