use serde::{Deserialize, Serialize};

use crate::program::{Address, ProgramError};
use crate::types::Endianness;

/// Parameter passing rules used for dynamic storage assignment.
///
/// Parameters go to `parameter_registers` in order, then to stack slots at
/// `stack_offset + n * stack_slot_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallingConvention {
    pub name: String,
    #[serde(default)]
    pub parameter_registers: Vec<String>,
    pub stack_offset: u64,
    pub stack_slot_size: u64,
}

impl Default for CallingConvention {
    fn default() -> Self {
        Self {
            name: "cdecl".to_string(),
            parameter_registers: Vec::new(),
            stack_offset: 4,
            stack_slot_size: 4,
        }
    }
}

impl CallingConvention {
    /// Storage location for the parameter at `ordinal`.
    pub fn storage_for(&self, ordinal: usize) -> String {
        match self.parameter_registers.get(ordinal) {
            Some(register) => register.clone(),
            None => {
                let slot = (ordinal - self.parameter_registers.len()) as u64;
                format!("Stack[{:#x}]", self.stack_offset + slot * self.stack_slot_size)
            }
        }
    }
}

/// Target description for a program model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSettings {
    /// Width of the default address space, in bits.
    pub address_size_bits: u8,
    #[serde(default)]
    pub endianness: Endianness,
    #[serde(default)]
    pub calling_convention: CallingConvention,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            address_size_bits: 32,
            endianness: Endianness::Little,
            calling_convention: CallingConvention::default(),
        }
    }
}

impl ProgramSettings {
    /// Translate a raw debug-info offset into an address, checking that it
    /// fits the address space.
    pub fn to_addr(&self, offset: u64) -> Result<Address, ProgramError> {
        let bits = u32::from(self.address_size_bits);
        if bits < 64 && offset >> bits != 0 {
            return Err(ProgramError::AddressOutOfBounds { offset, bits: self.address_size_bits });
        }
        Ok(Address(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_are_used_before_stack_slots() {
        let cc = CallingConvention {
            name: "mips_eabi".into(),
            parameter_registers: vec!["a0".into(), "a1".into()],
            stack_offset: 0x10,
            stack_slot_size: 8,
        };
        assert_eq!(cc.storage_for(0), "a0");
        assert_eq!(cc.storage_for(1), "a1");
        assert_eq!(cc.storage_for(2), "Stack[0x10]");
        assert_eq!(cc.storage_for(3), "Stack[0x18]");
    }

    #[test]
    fn to_addr_rejects_offsets_wider_than_the_space() {
        let settings = ProgramSettings::default();
        assert_eq!(settings.to_addr(0xffff_ffff).unwrap(), Address(0xffff_ffff));
        assert!(matches!(
            settings.to_addr(0x1_0000_0000),
            Err(ProgramError::AddressOutOfBounds { bits: 32, .. })
        ));
    }
}
