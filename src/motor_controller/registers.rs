//! Object dictionary entries of the N5 controller and the quoted-hex value
//! format its REST interface speaks.

use super::error::DriverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub index: u16,
    pub subindex: u8,
}

impl Register {
    pub const fn new(index: u16, subindex: u8) -> Self {
        Self { index, subindex }
    }

    pub fn url(&self, host: &str) -> String {
        format!("http://{}/od/{:04X}/{:02X}", host, self.index, self.subindex)
    }
}

pub const CONTROL_WORD: Register = Register::new(0x6040, 0x00);
pub const STATUS_WORD: Register = Register::new(0x6041, 0x00);
pub const OPERATING_MODE: Register = Register::new(0x6060, 0x00);
pub const PROFILE_VELOCITY: Register = Register::new(0x6081, 0x00);
pub const TARGET_POSITION: Register = Register::new(0x607A, 0x00);
pub const DIGITAL_INPUTS: Register = Register::new(0x60FD, 0x00);
pub const INPUT_1_VOLTAGE_RANGE: Register = Register::new(0x3240, 0x06);

/// Status word bit 10.
pub const TARGET_REACHED: u32 = 0x0400;
/// Digital input 1 as mapped into 0x60FD.
pub const INPUT_1: u32 = 0x0001_0000;

pub const PROFILE_POSITION_MODE: i64 = 1;
pub const INPUT_RANGE_24V: i64 = 1;

// Control word sequences.
pub const ENABLE_VOLTAGE: i64 = 0x06;
pub const SWITCH_ON: i64 = 0x07;
pub const ENABLE_RELATIVE: i64 = 0x4F;
pub const START_RELATIVE: i64 = 0x5F;
pub const CANCEL_MOVE: i64 = 0x0007;
pub const HOLD: i64 = 0x000F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterType {
    S16,
    U16,
    S32,
    U32,
    S08,
    U08,
}

impl RegisterType {
    fn range(&self) -> (i64, i64) {
        match self {
            RegisterType::S16 => (i16::MIN as i64, i16::MAX as i64),
            RegisterType::U16 => (0, u16::MAX as i64),
            RegisterType::S32 => (i32::MIN as i64, i32::MAX as i64),
            RegisterType::U32 => (0, u32::MAX as i64),
            RegisterType::S08 => (i8::MIN as i64, i8::MAX as i64),
            RegisterType::U08 => (0, u8::MAX as i64),
        }
    }

    /// Big-endian hex of the value at this register's width, wrapped in
    /// double quotes. Signed types use two's complement.
    pub fn encode(&self, value: i64) -> Result<String, DriverError> {
        let (min, max) = self.range();
        if value < min || value > max {
            return Err(DriverError::OutOfRange {
                what: "register value",
                value,
            });
        }

        let hex = match self {
            RegisterType::S16 | RegisterType::U16 => format!("{:04X}", value as u16),
            RegisterType::S32 | RegisterType::U32 => format!("{:08X}", value as u32),
            RegisterType::S08 | RegisterType::U08 => format!("{:02X}", value as u8),
        };
        Ok(format!("\"{}\"", hex))
    }
}

/// Parse a register read. The controller answers with quoted hex and no sign
/// information, so the value is returned unsigned.
pub fn decode(body: &str) -> Result<u32, DriverError> {
    let trimmed = body.trim().trim_matches('"');
    u32::from_str_radix(trimmed, 16).map_err(|_| DriverError::InvalidResponse(body.to_string()))
}
