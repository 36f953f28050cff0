//! GPIO / peripheral pin assignments for the PulseNode main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! The monitored line bank is split into two groups that map one-to-one onto
//! the two bytes of the binary-inputs register: the counter group (lines that
//! also accumulate pulses) and the plain-binary group.

// ---------------------------------------------------------------------------
// Monitored input lines — plain binary group
// ---------------------------------------------------------------------------

/// Number of plain-binary monitored lines (bits 0–7 of the low state byte).
pub const BINARY_LINE_COUNT: usize = 8;

/// GPIOs of the plain-binary lines, in bit order (index = bit position).
/// Dry-contact inputs with internal pull-ups; closing the contact pulls LOW.
pub const BINARY_LINE_GPIOS: [i32; BINARY_LINE_COUNT] = [4, 5, 6, 7, 15, 16, 17, 18];

// ---------------------------------------------------------------------------
// Monitored input lines — counter group
// ---------------------------------------------------------------------------

/// Number of counter-capable monitored lines (bits 0–3 of the high state byte).
pub const COUNTER_LINE_COUNT: usize = 4;

/// GPIOs of the counter-capable lines, in bit order.
/// Typical sources: utility-meter reed switches, S0 pulse outputs.
pub const COUNTER_LINE_GPIOS: [i32; COUNTER_LINE_COUNT] = [9, 10, 11, 12];

// ---------------------------------------------------------------------------
// Supply-voltage measurement (ADC1)
// ---------------------------------------------------------------------------

/// Battery/supply divider tap — ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const SUPPLY_ADC_GPIO: i32 = 1;

/// ADC1 channel number for the supply divider.
pub const ADC1_CH_SUPPLY: u32 = 0;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_groups_do_not_overlap() {
        for b in BINARY_LINE_GPIOS {
            assert!(
                !COUNTER_LINE_GPIOS.contains(&b),
                "GPIO {b} assigned to both line groups"
            );
        }
    }

    #[test]
    fn supply_adc_is_not_a_monitored_line() {
        assert!(!BINARY_LINE_GPIOS.contains(&SUPPLY_ADC_GPIO));
        assert!(!COUNTER_LINE_GPIOS.contains(&SUPPLY_ADC_GPIO));
    }
}
