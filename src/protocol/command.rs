//! Command vocabulary
//!
//! Each validated frame maps to exactly one command. Parsing is total: any
//! opcode or subcode outside the vocabulary yields [`Command::Unrecognized`]
//! so malformed traffic is an explicit, ignorable case rather than a silent
//! fall-through.
//!
//! Argument encodings are uneven on the wire and kept that way: channel
//! carrying commands (`T`, `L`, `E`, `F`) use raw indices while subcoded
//! commands (`U`, `S`, `M`, `X`, `P`, `C`, `R`) use ASCII digits.

use super::frame::PAYLOAD_LEN;
use crate::platform::traits::DriveMode;

/// Read-only status query, selected by the `S` subcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Query {
    /// Plain acknowledge handshake
    Ack,
    /// Firmware version, high byte first
    FirmwareVersion,
    /// Firmware build number, high byte first
    BuildNumber,
    /// Active channel index
    ActiveChannel,
}

/// One decoded host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Select and load a channel (full tool change)
    ToolChange { channel: u8 },
    /// Select a channel and feed filament to the sensor
    Load { channel: u8 },
    /// Retract filament from the print head
    Unload,
    /// Read-only status query
    Query(Query),
    /// Reconfigure all axis drivers
    SetDriveMode(DriveMode),
    /// Record a channel's material class
    SetFilamentType { channel: u8, class: u8 },
    /// Arm a delayed hardware reset
    Reset,
    /// Report filament presence
    ReadSensor,
    /// Resume feeding into the drive gears
    ContinueLoad,
    /// Retract and park a channel for filament removal
    Eject { channel: u8 },
    /// Resume normal operation after an eject
    Recover,
    /// Anything outside the vocabulary; dropped without a reply
    Unrecognized { op: u8 },
}

impl Command {
    /// Decode a validated frame payload
    pub fn parse(payload: [u8; PAYLOAD_LEN]) -> Self {
        let [op, arg1, arg2] = payload;
        match op {
            b'T' => Command::ToolChange { channel: arg1 },
            b'L' => Command::Load { channel: arg1 },
            b'U' if arg1 == b'0' => Command::Unload,
            b'S' => match arg1 {
                b'0' => Command::Query(Query::Ack),
                b'1' => Command::Query(Query::FirmwareVersion),
                b'2' => Command::Query(Query::BuildNumber),
                b'3' => Command::Query(Query::ActiveChannel),
                _ => Command::Unrecognized { op },
            },
            b'M' => match arg1 {
                b'0' => Command::SetDriveMode(DriveMode::Normal),
                b'1' => Command::SetDriveMode(DriveMode::Stealth),
                _ => Command::Unrecognized { op },
            },
            b'F' => Command::SetFilamentType {
                channel: arg1,
                class: arg2,
            },
            b'X' if arg1 == b'0' => Command::Reset,
            b'P' if arg1 == b'0' => Command::ReadSensor,
            b'C' if arg1 == b'0' => Command::ContinueLoad,
            b'E' => Command::Eject { channel: arg1 },
            b'R' if arg1 == b'0' => Command::Recover,
            _ => Command::Unrecognized { op },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_commands_use_raw_indices() {
        assert_eq!(Command::parse([b'T', 2, 0]), Command::ToolChange { channel: 2 });
        assert_eq!(Command::parse([b'L', 0, 0]), Command::Load { channel: 0 });
        assert_eq!(Command::parse([b'E', 4, 0]), Command::Eject { channel: 4 });
        assert_eq!(
            Command::parse([b'F', 1, 2]),
            Command::SetFilamentType { channel: 1, class: 2 }
        );
    }

    #[test]
    fn subcoded_commands_use_ascii_digits() {
        assert_eq!(Command::parse([b'U', b'0', 0]), Command::Unload);
        assert_eq!(Command::parse([b'X', b'0', 0]), Command::Reset);
        assert_eq!(Command::parse([b'P', b'0', 0]), Command::ReadSensor);
        assert_eq!(Command::parse([b'C', b'0', 0]), Command::ContinueLoad);
        assert_eq!(Command::parse([b'R', b'0', 0]), Command::Recover);
        // Raw zero is not a valid subcode
        assert_eq!(
            Command::parse([b'U', 0, 0]),
            Command::Unrecognized { op: b'U' }
        );
    }

    #[test]
    fn query_subcodes() {
        assert_eq!(Command::parse([b'S', b'0', 0]), Command::Query(Query::Ack));
        assert_eq!(
            Command::parse([b'S', b'1', 0]),
            Command::Query(Query::FirmwareVersion)
        );
        assert_eq!(
            Command::parse([b'S', b'2', 0]),
            Command::Query(Query::BuildNumber)
        );
        assert_eq!(
            Command::parse([b'S', b'3', 0]),
            Command::Query(Query::ActiveChannel)
        );
        assert_eq!(
            Command::parse([b'S', b'4', 0]),
            Command::Unrecognized { op: b'S' }
        );
    }

    #[test]
    fn drive_mode_subcodes() {
        assert_eq!(
            Command::parse([b'M', b'0', 0]),
            Command::SetDriveMode(DriveMode::Normal)
        );
        assert_eq!(
            Command::parse([b'M', b'1', 0]),
            Command::SetDriveMode(DriveMode::Stealth)
        );
    }

    #[test]
    fn unknown_opcodes_are_unrecognized() {
        assert_eq!(Command::parse([b'Q', 0, 0]), Command::Unrecognized { op: b'Q' });
        assert_eq!(Command::parse([0x00, 0, 0]), Command::Unrecognized { op: 0 });
    }
}
