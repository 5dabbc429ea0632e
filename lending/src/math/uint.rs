#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    /// 192-bit unsigned integer backing the wad-scaled decimal type
    pub struct U192(3);
}
