//! ESP-IDF peripheral adapters.
//!
//! Raw `esp_idf_svc::sys` calls behind the port traits: a oneshot ADC unit
//! per analog sensor, an open-drain relay GPIO, and the UART driver for
//! both directions of the command line.

use core::ffi::c_void;
use core::ptr;

use esp_idf_svc::sys::*;
use log::{info, warn};

use crate::app::ports::{AnalogPort, DigitalOutputPort, SerialRx, SerialTx};
use crate::error::HalError;
use crate::pins;
use embedded_hal::digital::PinState;

// ── ADC (oneshot) ─────────────────────────────────────────────

/// One ADC unit with a single configured channel.
pub struct EspAnalog {
    unit: adc_unit_t,
    channel: adc_channel_t,
    handle: adc_oneshot_unit_handle_t,
}

// SAFETY: the handle is only used through `&mut self`, and every access is
// serialised by the owning sensor gate.
unsafe impl Send for EspAnalog {}

impl EspAnalog {
    pub fn temperature() -> Self {
        Self::new(adc_unit_t_ADC_UNIT_1, pins::TEMP_ADC_CHANNEL)
    }

    pub fn light() -> Self {
        Self::new(adc_unit_t_ADC_UNIT_2, pins::LIGHT_ADC_CHANNEL)
    }

    fn new(unit: adc_unit_t, channel: adc_channel_t) -> Self {
        Self {
            unit,
            channel,
            handle: ptr::null_mut(),
        }
    }
}

impl AnalogPort for EspAnalog {
    fn init(&mut self) -> Result<(), HalError> {
        if !self.handle.is_null() {
            return Ok(());
        }
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: self.unit,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        // SAFETY: `handle` is an out-pointer owned by self.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut self.handle) };
        if ret != ESP_OK as i32 {
            return Err(HalError::AnalogInitFailed);
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: handle was just created.
        let ret = unsafe { adc_oneshot_config_channel(self.handle, self.channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            self.deinit();
            return Err(HalError::AnalogInitFailed);
        }
        info!("ADC{} CH{} configured", self.unit, self.channel);
        Ok(())
    }

    fn deinit(&mut self) {
        if self.handle.is_null() {
            return;
        }
        // SAFETY: handle is live and not used after this call.
        let ret = unsafe { adc_oneshot_del_unit(self.handle) };
        if ret != ESP_OK as i32 {
            warn!("ADC{} release returned {}", self.unit, ret);
        }
        self.handle = ptr::null_mut();
    }

    fn sample_ready(&mut self) -> bool {
        !self.handle.is_null()
    }

    fn read(&mut self) -> Result<u16, HalError> {
        if self.handle.is_null() {
            return Err(HalError::AnalogReadFailed);
        }
        let mut raw: i32 = 0;
        // SAFETY: handle is live; oneshot reads block for one conversion.
        let ret = unsafe { adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(HalError::AnalogReadFailed);
        }
        Ok(raw.clamp(0, i32::from(pins::ADC_MAX)) as u16)
    }
}

// ── Relay GPIO ────────────────────────────────────────────────

/// Open-drain output on the relay pin.
pub struct EspRelayPin {
    gpio: i32,
}

impl EspRelayPin {
    pub fn new() -> Self {
        Self {
            gpio: pins::RELAY_GPIO,
        }
    }
}

impl Default for EspRelayPin {
    fn default() -> Self {
        Self::new()
    }
}

fn level(state: PinState) -> u32 {
    match state {
        PinState::High => 1,
        PinState::Low => 0,
    }
}

impl DigitalOutputPort for EspRelayPin {
    fn init(&mut self, idle: PinState) -> Result<(), HalError> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.gpio,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT_OD,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: plain register configuration of a pin this adapter owns.
        unsafe {
            if gpio_config(&cfg) != ESP_OK as i32 {
                return Err(HalError::GpioConfigFailed);
            }
            if gpio_set_level(self.gpio, level(idle)) != ESP_OK as i32 {
                return Err(HalError::GpioConfigFailed);
            }
        }
        Ok(())
    }

    fn deinit(&mut self) {
        // SAFETY: returns the pin to its reset state.
        unsafe {
            gpio_reset_pin(self.gpio);
        }
    }

    fn write(&mut self, state: PinState) -> Result<(), HalError> {
        // SAFETY: pin was configured in `init`; the relay gate serialises calls.
        let ret = unsafe { gpio_set_level(self.gpio, level(state)) };
        if ret != ESP_OK as i32 {
            return Err(HalError::GpioWriteFailed);
        }
        Ok(())
    }
}

// ── UART ──────────────────────────────────────────────────────

/// Install the UART driver for the command line at `baud`, 8N1.
pub fn install_uart(baud: u32) -> Result<(), HalError> {
    let cfg = uart_config_t {
        baud_rate: baud as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    // SAFETY: one-time driver installation from main before tasks start.
    unsafe {
        if uart_param_config(pins::UART_PORT, &cfg) != ESP_OK as i32 {
            return Err(HalError::SerialWriteFailed);
        }
        if uart_set_pin(pins::UART_PORT, pins::UART_TX_GPIO, pins::UART_RX_GPIO, -1, -1)
            != ESP_OK as i32
        {
            return Err(HalError::SerialWriteFailed);
        }
        if uart_driver_install(
            pins::UART_PORT,
            pins::UART_RX_BUF_LEN,
            0,
            0,
            ptr::null_mut(),
            0,
        ) != ESP_OK as i32
        {
            return Err(HalError::SerialWriteFailed);
        }
    }
    info!("UART{} installed at {} baud", pins::UART_PORT, baud);
    Ok(())
}

/// Blocking transmit on the command UART.
pub struct EspUartTx;

impl SerialTx for EspUartTx {
    fn send_byte(&mut self, byte: u8) -> Result<(), HalError> {
        // SAFETY: the driver was installed by `install_uart`.
        let n = unsafe {
            uart_write_bytes(pins::UART_PORT, &byte as *const u8 as *const c_void, 1)
        };
        if n != 1 {
            return Err(HalError::SerialWriteFailed);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        // SAFETY: as above.
        let ret = unsafe { uart_wait_tx_done(pins::UART_PORT, u32::MAX) };
        if ret != ESP_OK as i32 {
            return Err(HalError::SerialWriteFailed);
        }
        Ok(())
    }
}

/// Receive side of the command UART.
///
/// The driver's own interrupt fills its RX ring; this reads from the ring.
pub struct EspUartRx;

impl SerialRx for EspUartRx {
    fn wait_byte(&mut self) -> Result<u8, HalError> {
        let mut byte = 0u8;
        // SAFETY: the driver was installed by `install_uart`; one byte is
        // written into `byte`.
        let n = unsafe {
            uart_read_bytes(
                pins::UART_PORT,
                &mut byte as *mut u8 as *mut c_void,
                1,
                u32::MAX,
            )
        };
        if n != 1 {
            return Err(HalError::SerialReadFailed);
        }
        Ok(byte)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, HalError> {
        let mut buffered: usize = 0;
        // SAFETY: as above; `buffered` outlives the call.
        let ret = unsafe { uart_get_buffered_data_len(pins::UART_PORT, &mut buffered) };
        if ret != ESP_OK as i32 {
            return Err(HalError::SerialReadFailed);
        }
        let want = buffered.min(buf.len());
        if want == 0 {
            return Ok(0);
        }
        // SAFETY: `buf` holds at least `want` bytes, which are already in
        // the ring, so a zero-tick wait returns them without blocking.
        let n = unsafe {
            uart_read_bytes(pins::UART_PORT, buf.as_mut_ptr() as *mut c_void, want as u32, 0)
        };
        if n < 0 {
            return Err(HalError::SerialReadFailed);
        }
        Ok(n as usize)
    }
}
