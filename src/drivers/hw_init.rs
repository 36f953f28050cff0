//! One-shot hardware peripheral initialization.
//!
//! Configures the monitored input GPIOs, the supply-divider ADC channel,
//! and the GPIO ISR service using raw ESP-IDF sys calls. Called once from
//! `main()` before the wake/report loop starts.
//!
//! Also owns the interrupt mask/unmask helpers behind
//! [`IrqControl`](crate::app::ports::IrqControl) and the light-sleep wake
//! arming used by the power manager.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

/// All monitored line GPIOs, binary group then counter group.
pub fn all_line_gpios() -> impl Iterator<Item = i32> {
    pins::BINARY_LINE_GPIOS
        .into_iter()
        .chain(pins::COUNTER_LINE_GPIOS)
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the wake loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the wake loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), pins::ADC1_CH_SUPPLY, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=supply)", pins::ADC1_CH_SUPPLY);
    Ok(())
}

/// One-shot blocking conversion; returns 0 on a failed read so the caller's
/// sentinel path handles it.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this
    // function is called; single-threaded main-loop access guaranteed.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for pin in all_line_gpios() {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: {} line inputs configured", all_line_gpios().count());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn line_gpio_isr(_arg: *mut core::ffi::c_void) {
    // The handler's only job: mark the pending flag.  Sampling is deferred
    // to the main flow so no state composition happens in ISR context.
    crate::power::line_change_isr_handler();
}

/// Install the GPIO ISR service and register the any-edge line-change ISR
/// on every monitored line.  Call after `init_peripherals()` and after the
/// startup sequence has published its initial registers.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). The registered handler is
    // a static function that only stores to an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for pin in all_line_gpios() {
            gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_ANYEDGE);
            gpio_isr_handler_add(pin, Some(line_gpio_isr), core::ptr::null_mut());
            gpio_intr_enable(pin);
        }

        info!(
            "hw_init: ISR service installed on {} lines (any edge)",
            all_line_gpios().count()
        );
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── Interrupt masking ─────────────────────────────────────────

/// Disable the line-change interrupt on every monitored line.
/// Edges are still latched into the wake path by the pending flag.
#[cfg(target_os = "espidf")]
pub fn mask_line_interrupts() {
    for pin in all_line_gpios() {
        // SAFETY: interrupt-controller register write on a configured pin.
        unsafe {
            gpio_intr_disable(pin);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn mask_line_interrupts() {}

/// Re-enable the line-change interrupt on every monitored line.
#[cfg(target_os = "espidf")]
pub fn unmask_line_interrupts() {
    for pin in all_line_gpios() {
        // SAFETY: interrupt-controller register write on a configured pin.
        unsafe {
            gpio_intr_enable(pin);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn unmask_line_interrupts() {}

// ── Light-sleep wake arming ───────────────────────────────────

/// Arm every monitored line as a light-sleep GPIO wake source at the level
/// opposite its current reading, so any edge while asleep wakes the node.
/// Re-armed before every sleep because the "opposite" level moves with the
/// line state.
#[cfg(target_os = "espidf")]
pub fn arm_line_wakeups() {
    // SAFETY: wake configuration calls are main-task-only and operate on
    // pins configured during init_gpio_inputs().
    unsafe {
        for pin in all_line_gpios() {
            let level = if gpio_get_level(pin) != 0 {
                gpio_int_type_t_GPIO_INTR_LOW_LEVEL
            } else {
                gpio_int_type_t_GPIO_INTR_HIGH_LEVEL
            };
            gpio_wakeup_enable(pin, level);
        }
        esp_sleep_enable_gpio_wakeup();
    }
}
