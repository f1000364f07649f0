//! Record geometry and fixed addresses shared by the loader and the testbench.

/// Number of 32-bit memory words packed into one memory-init record.
///
/// The memory-init port is 512 bits wide, so sixteen words fill one record.
pub const WORDS_PER_RECORD: usize = 16;

/// Program counter the core starts fetching from after an image is loaded.
pub const DEFAULT_START_PC: u32 = 0x200;

/// The only address marker a VMH image may carry.
pub const VMH_HEADER: &str = "@0";

/// Line comment marker in VMH text.
pub const VMH_COMMENT: &str = "//";
