//! Railboard - Desktop Departure Board Firmware
//!
//! Main firmware binary for an ESP32-S3 driving a 480×320 ILI9488 panel.
//! Core 0 polls the Darwin board service, repaints the board and serves
//! the browser control surface; core 1 animates the advisory ticker.

#![no_std]
#![no_main]

extern crate alloc;

use alloc::string::ToString;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_sync::mutex::Mutex;
use esp_hal::assign_resources;
use esp_hal::clock::CpuClock;
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::rng::Rng;
use esp_hal::system::Stack as CoreStack;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::Controller;
use {esp_backtrace as _, esp_println as _};

use railboard_core::board::FetchPipeline;
use railboard_core::ticker;

use crate::channels::{Pipeline, SharedPanel, SharedSettings, SharedStore};
use crate::config::{SettingsPersistence, DEFAULTS};
use crate::net::transport::TcpState;
use crate::net::HttpsTransport;
use crate::storage::FlashFileStore;

mod channels;
mod config;
mod display;
mod net;
mod storage;
mod tasks;

esp_bootloader_esp_idf::esp_app_desc!();

/// Heap for the radio, response body, TLS buffers and ticker sprite
const HEAP_SIZE: usize = 192 * 1024;

/// Stack of the ticker core
const CORE1_STACK: usize = 8192;

/// Sockets: one HTTPS client, one control server, DNS and DHCP
const NET_SOCKETS: usize = 4;

/// Allocate a value into a `static` exactly once
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

assign_resources! {
    Resources<'d> {
        panel: PanelResources<'d> {
            cs: GPIO16,
            dc: GPIO17,
            wr: GPIO4,
            d0: GPIO8,
            d1: GPIO9,
            d2: GPIO10,
            d3: GPIO11,
            d4: GPIO12,
            d5: GPIO13,
            d6: GPIO14,
            d7: GPIO15,
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    info!("Railboard firmware starting...");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);
    info!("Peripherals initialized");

    // Panel first, so the loading screen appears while the rest comes up
    let panel = match display::init(resources.panel) {
        Ok(panel) => panel,
        Err(e) => panic!("Display init failed: {:?}", e),
    };
    let display: &'static SharedPanel = mk_static!(SharedPanel, Mutex::new(panel));
    info!("Display initialized");

    // Settings and the cached ticker text from flash
    let mut flash = FlashFileStore::new(peripherals.FLASH);
    let settings = SettingsPersistence::new(&mut flash)
        .load_or_default(&DEFAULTS)
        .await;
    let cached_ticker = match ticker::load(&mut flash).await {
        Ok(content) => Some(content),
        Err(e) => {
            info!("No cached ticker text ({:?})", e);
            None
        }
    };
    let wifi_ssid = settings.wifi_ssid.as_str().to_string();
    let wifi_password = settings.wifi_password.as_str().to_string();
    let store: &'static SharedStore = mk_static!(SharedStore, Mutex::new(flash));
    let settings: &'static SharedSettings = mk_static!(SharedSettings, Mutex::new(settings));
    let pipeline: &'static Pipeline = mk_static!(Pipeline, FetchPipeline::new());

    // Ticker animation on the second core
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let core1_stack = mk_static!(CoreStack<CORE1_STACK>, CoreStack::new());
    esp_rtos::start_second_core::<CORE1_STACK>(
        peripherals.CPU_CTRL,
        sw_ints.software_interrupt0,
        sw_ints.software_interrupt1,
        core1_stack,
        move || {
            let executor = mk_static!(
                esp_rtos::embassy::Executor,
                esp_rtos::embassy::Executor::new()
            );
            executor.run(|spawner| {
                spawner.must_spawn(tasks::ticker_task(display, cached_ticker));
            });
        },
    );
    info!("Ticker running on core 1");

    // Wi-Fi and the network stack
    let radio = mk_static!(
        Controller<'static>,
        match esp_radio::init() {
            Ok(radio) => radio,
            Err(e) => panic!("Radio init failed: {:?}", e),
        }
    );
    let (controller, interfaces) =
        match esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()) {
            Ok(parts) => parts,
            Err(e) => panic!("Wi-Fi init failed: {:?}", e),
        };

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(
            StackResources<NET_SOCKETS>,
            StackResources::<NET_SOCKETS>::new()
        ),
        seed,
    );

    let tcp_state = mk_static!(TcpState, TcpState::new());
    let transport = HttpsTransport::new(stack, tcp_state, rng);

    spawner.must_spawn(tasks::wifi_task(controller, wifi_ssid, wifi_password));
    spawner.must_spawn(tasks::net_task(runner));
    spawner.must_spawn(tasks::reboot_task());
    spawner.must_spawn(tasks::http_task(stack, settings, store));
    spawner.must_spawn(tasks::board_task(
        tasks::BoardContext {
            display,
            store,
            settings,
            pipeline,
            stack,
        },
        transport,
    ));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
