//! Station-mode association and the network stack runner

use alloc::string::String;

use defmt::*;
use embassy_net::Runner;
use embassy_time::Timer;
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};

/// Pause before rejoining after a drop or a failed attempt
const RECONNECT_MS: u64 = 5000;

/// Keep the station joined to `ssid`
#[embassy_executor::task]
pub async fn wifi_task(mut controller: WifiController<'static>, ssid: String, password: String) {
    info!("Wi-Fi task started");

    if ssid.is_empty() {
        warn!("No Wi-Fi SSID configured, staying offline");
        return;
    }

    loop {
        if matches!(esp_radio::wifi::sta_state(), WifiStaState::Connected) {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("Wi-Fi disconnected");
            Timer::after_millis(RECONNECT_MS).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(ssid.clone())
                    .with_password(password.clone()),
            );
            if let Err(e) = controller.set_config(&config) {
                error!("Wi-Fi configuration rejected: {:?}", e);
                return;
            }
            match controller.start_async().await {
                Ok(()) => info!("Wi-Fi started"),
                Err(e) => {
                    warn!("Wi-Fi start failed: {:?}", e);
                    Timer::after_millis(RECONNECT_MS).await;
                    continue;
                }
            }
        }

        info!("Joining '{}'", ssid.as_str());
        match controller.connect_async().await {
            Ok(()) => info!("Wi-Fi connected"),
            Err(e) => {
                warn!("Wi-Fi join failed: {:?}", e);
                Timer::after_millis(RECONNECT_MS).await;
            }
        }
    }
}

/// Drive the embassy-net stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
