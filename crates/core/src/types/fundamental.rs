//! DWARF v1 fundamental type codes (`FT_*`) and type modifiers (`MOD_*`).

use super::DataType;

pub const FT_CHAR: u16 = 0x0001;
pub const FT_SIGNED_CHAR: u16 = 0x0002;
pub const FT_UNSIGNED_CHAR: u16 = 0x0003;
pub const FT_SHORT: u16 = 0x0004;
pub const FT_SIGNED_SHORT: u16 = 0x0005;
pub const FT_UNSIGNED_SHORT: u16 = 0x0006;
pub const FT_INTEGER: u16 = 0x0007;
pub const FT_SIGNED_INTEGER: u16 = 0x0008;
pub const FT_UNSIGNED_INTEGER: u16 = 0x0009;
pub const FT_LONG: u16 = 0x000a;
pub const FT_SIGNED_LONG: u16 = 0x000b;
pub const FT_UNSIGNED_LONG: u16 = 0x000c;
pub const FT_POINTER: u16 = 0x000d;
pub const FT_FLOAT: u16 = 0x000e;
pub const FT_DBL_PREC_FLOAT: u16 = 0x000f;
pub const FT_EXT_PREC_FLOAT: u16 = 0x0010;
pub const FT_COMPLEX: u16 = 0x0011;
pub const FT_DBL_PREC_COMPLEX: u16 = 0x0012;
pub const FT_VOID: u16 = 0x0014;
pub const FT_BOOLEAN: u16 = 0x0015;
pub const FT_EXT_PREC_COMPLEX: u16 = 0x0016;
pub const FT_LABEL: u16 = 0x0017;
// GNU extensions
pub const FT_LONG_LONG: u16 = 0x8008;
pub const FT_SIGNED_LONG_LONG: u16 = 0x8108;
pub const FT_UNSIGNED_LONG_LONG: u16 = 0x8208;

pub const MOD_POINTER_TO: u8 = 0x01;
pub const MOD_REFERENCE_TO: u8 = 0x02;
pub const MOD_CONST: u8 = 0x03;
pub const MOD_VOLATILE: u8 = 0x04;

/// Map a fundamental type code to a data type.
///
/// `FT_pointer` is a generic pointer and is handled by the caller, since it
/// needs a handle to `void`. Returns `None` for unknown codes.
pub fn fundamental_type(code: u16) -> Option<DataType> {
    let base = |name: &'static str, size: u32| Some(DataType::Base { name, size });
    match code {
        FT_CHAR => base("char", 1),
        FT_SIGNED_CHAR => base("schar", 1),
        FT_UNSIGNED_CHAR => base("uchar", 1),
        FT_SHORT | FT_SIGNED_SHORT => base("short", 2),
        FT_UNSIGNED_SHORT => base("ushort", 2),
        FT_INTEGER | FT_SIGNED_INTEGER => base("int", 4),
        FT_UNSIGNED_INTEGER => base("uint", 4),
        FT_LONG | FT_SIGNED_LONG => base("long", 4),
        FT_UNSIGNED_LONG => base("ulong", 4),
        FT_LONG_LONG | FT_SIGNED_LONG_LONG => base("longlong", 8),
        FT_UNSIGNED_LONG_LONG => base("ulonglong", 8),
        FT_FLOAT => base("float", 4),
        FT_DBL_PREC_FLOAT => base("double", 8),
        FT_EXT_PREC_FLOAT => base("longdouble", 16),
        FT_COMPLEX => base("complex", 8),
        FT_DBL_PREC_COMPLEX => base("doublecomplex", 16),
        FT_EXT_PREC_COMPLEX => base("longdoublecomplex", 32),
        FT_BOOLEAN => base("bool", 1),
        FT_LABEL => base("label", 4),
        FT_VOID => Some(DataType::Void),
        _ => None,
    }
}

/// Whether a modifier byte wraps the type in a pointer. `const` and
/// `volatile` carry no layout information and are dropped.
pub fn is_pointer_modifier(modifier: u8) -> bool {
    matches!(modifier, MOD_POINTER_TO | MOD_REFERENCE_TO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_base_types() {
        assert_eq!(fundamental_type(FT_INTEGER), Some(DataType::Base { name: "int", size: 4 }));
        assert_eq!(fundamental_type(FT_VOID), Some(DataType::Void));
        assert_eq!(fundamental_type(0x7777), None);
    }

    #[test]
    fn only_pointer_and_reference_modifiers_wrap() {
        assert!(is_pointer_modifier(MOD_POINTER_TO));
        assert!(is_pointer_modifier(MOD_REFERENCE_TO));
        assert!(!is_pointer_modifier(MOD_CONST));
        assert!(!is_pointer_modifier(MOD_VOLATILE));
    }
}
