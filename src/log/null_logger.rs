/*!

Without the `logging` feature no logger is installed; only the `log` crate's maximum level is set.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Applies the global level of this `LogConfiguration` to the `log` facade.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
