use getset::{CopyGetters, Getters};

use crate::process::Process;

/// A process together with the number of cycles it waits after the previous
/// schedule of the same queue before it is released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct Schedule {
    #[getset(get = "pub")]
    process: Process,
    #[getset(get_copy = "pub")]
    delay: u32,
}

impl Schedule {
    pub fn new(process: Process, delay: u32) -> Self {
        Self { process, delay }
    }

    pub fn into_process(self) -> Process {
        self.process
    }
}
