use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use portal_snake_core::{Cell, GridBounds, WallSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "snake";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded map payload.
pub(crate) const SNAPSHOT_HEADER: &str = "snake:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Interior walls of a layout together with the grid they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MapSnapshot {
    /// Number of columns in the grid.
    pub(crate) width: u32,
    /// Number of rows in the grid.
    pub(crate) height: u32,
    /// Wall cells strictly inside the border.
    pub(crate) walls: Vec<Cell>,
}

impl MapSnapshot {
    /// Captures the interior walls of the provided layout.
    pub(crate) fn capture(width: u32, height: u32, walls: &WallSet) -> Self {
        let bounds = GridBounds::for_grid(width, height);
        Self {
            width,
            height,
            walls: walls
                .iter()
                .filter(|cell| bounds.interior_contains(*cell))
                .collect(),
        }
    }

    /// Encodes the snapshot into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, MapTransferError> {
        let payload = SerializableMap {
            walls: self.walls.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(MapTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.width, self.height
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, MapTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(MapTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(MapTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(MapTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(MapTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(MapTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(MapTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(MapTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(MapTransferError::InvalidEncoding)?;
        let decoded: SerializableMap =
            serde_json::from_slice(&bytes).map_err(MapTransferError::InvalidPayload)?;

        let bounds = GridBounds::for_grid(width, height);
        if let Some(cell) = decoded
            .walls
            .iter()
            .find(|cell| !bounds.interior_contains(**cell))
        {
            return Err(MapTransferError::WallOutsideInterior {
                x: cell.x(),
                y: cell.y(),
            });
        }

        Ok(Self {
            width,
            height,
            walls: decoded.walls,
        })
    }

    /// Wall set holding the border and the captured interior walls.
    pub(crate) fn to_walls(&self) -> WallSet {
        let mut walls = WallSet::border(GridBounds::for_grid(self.width, self.height));
        for cell in &self.walls {
            walls.insert(*cell);
        }
        walls
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableMap {
    walls: Vec<Cell>,
}

/// Errors that can occur while encoding or decoding map transfer strings.
#[derive(Debug, Error)]
pub(crate) enum MapTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("map string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded map.
    #[error("map string is missing the prefix")]
    MissingPrefix,
    /// The encoded map did not contain a version segment.
    #[error("map string is missing the version")]
    MissingVersion,
    /// The encoded map did not include grid dimensions.
    #[error("map string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded map did not include the payload segment.
    #[error("map string is missing the payload")]
    MissingPayload,
    /// The encoded map used an unexpected prefix segment.
    #[error("map prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded map used an unsupported version identifier.
    #[error("map version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded map.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode map payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse map payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The payload could not be serialised.
    #[error("could not serialize map payload")]
    Serialize(#[source] serde_json::Error),
    /// A wall lies on the border or outside the grid.
    #[error("wall ({x}, {y}) lies outside the grid interior")]
    WallOutsideInterior {
        /// Column of the offending wall.
        x: i32,
        /// Row of the offending wall.
        y: i32,
    },
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), MapTransferError> {
    let invalid = || MapTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(|c| c == 'x' || c == 'X').ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty_map() {
        let snapshot = MapSnapshot {
            width: 12,
            height: 8,
            walls: Vec::new(),
        };

        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:12x8:")));

        let decoded = MapSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn capture_drops_border_cells() {
        let bounds = GridBounds::for_grid(10, 10);
        let mut walls = WallSet::border(bounds);
        walls.insert(Cell::new(4, 4));
        walls.insert(Cell::new(5, 4));

        let snapshot = MapSnapshot::capture(10, 10, &walls);

        assert_eq!(snapshot.walls, vec![Cell::new(4, 4), Cell::new(5, 4)]);
        assert_eq!(snapshot.to_walls(), walls);
    }

    #[test]
    fn decode_rejects_foreign_prefix() {
        let error = MapSnapshot::decode("maze:v1:4x4:e30").expect_err("prefix mismatch");
        assert!(matches!(error, MapTransferError::InvalidPrefix(prefix) if prefix == "maze"));
    }

    #[test]
    fn decode_rejects_zero_dimensions() {
        let error = MapSnapshot::decode("snake:v1:0x4:e30").expect_err("zero width");
        assert!(matches!(error, MapTransferError::InvalidDimensions(_)));
    }

    #[test]
    fn decode_rejects_missing_payload() {
        let error = MapSnapshot::decode("snake:v1:4x4").expect_err("no payload");
        assert!(matches!(error, MapTransferError::MissingPayload));
        assert!(matches!(
            MapSnapshot::decode("   ").expect_err("blank"),
            MapTransferError::EmptyPayload
        ));
    }

    #[test]
    fn decode_rejects_walls_on_border() {
        let snapshot = MapSnapshot {
            width: 10,
            height: 10,
            walls: vec![Cell::new(1, 3)],
        };
        let encoded = snapshot.encode().expect("snapshot encodes");

        let error = MapSnapshot::decode(&encoded).expect_err("border wall");
        assert_eq!(error.to_string(), "wall (1, 3) lies outside the grid interior");
    }

    #[test]
    fn decode_reports_bad_base64() {
        let error = MapSnapshot::decode("snake:v1:10x10:!!").expect_err("bad encoding");
        assert!(matches!(error, MapTransferError::InvalidEncoding(_)));
    }
}
