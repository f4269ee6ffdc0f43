//! Deferred restart, so the control server can answer first

use defmt::*;
use embassy_time::Timer;

use crate::channels::REBOOT;

#[embassy_executor::task]
pub async fn reboot_task() {
    let delay_ms = REBOOT.wait().await;
    info!("Rebooting in {}ms", delay_ms);
    Timer::after_millis(delay_ms).await;
    esp_hal::system::software_reset();
}
