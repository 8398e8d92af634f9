//! Buffer Sizes for Firmware Collaborators
//!
//! Sizing used by the tasks that own ring storage. The ring itself takes
//! any size; these are the values the ESP32 firmware is built around.

// ===== KNOCK ACQUISITION =====

/// Samples in one knock analysis window.
///
/// One engine-cycle window of ADC readings:
/// - 512 samples × 2 bytes = 1KB of storage
/// - Power of two so slot arithmetic stays cheap
///
/// Source: knock monitor task sizing
pub const KNOCK_WINDOW_SAMPLES: usize = 512;

/// Bytes per raw knock sample.
///
/// 12-bit ADC reading stored in a `u16`.
///
/// Source: ESP32 ADC1 resolution
pub const KNOCK_SAMPLE_SIZE: usize = 2;

/// Storage for one knock window in bytes.
pub const KNOCK_WINDOW_BYTES: usize = KNOCK_WINDOW_SAMPLES * KNOCK_SAMPLE_SIZE;

/// Full-scale value of a knock sample.
///
/// Source: 12-bit ADC, 3.3V reference
pub const KNOCK_ADC_MAX: u16 = 4095;

// ===== CAN / OBD-II =====

/// Frames held by the CAN receive queue.
///
/// 16 frames covers a full PID polling round (6 PIDs at 20Hz)
/// with headroom for broadcast traffic.
///
/// Source: CAN RX driver buffer depth
pub const CAN_RX_QUEUE_DEPTH: usize = 16;

/// Maximum CAN payload length (classic CAN).
pub const CAN_MAX_DATA_LENGTH: usize = 8;

// ===== RADIO / BLE =====

/// Payloads waiting for BLE transmission.
///
/// Source: outbound radio queue depth
pub const RADIO_QUEUE_DEPTH: usize = 64;

/// Bytes per outbound radio payload.
///
/// Fits inside one negotiated BLE MTU.
///
/// Source: outbound radio queue record size
pub const RADIO_PAYLOAD_SIZE: usize = 512;

/// Storage for the outbound radio queue in bytes.
///
/// - 64 payloads × 512 bytes = 32KB
pub const RADIO_QUEUE_BYTES: usize = RADIO_QUEUE_DEPTH * RADIO_PAYLOAD_SIZE;

/// Largest BLE MTU the GATT server negotiates.
///
/// Source: BLE 4.2+ ATT maximum
pub const BLE_MTU_SIZE: usize = 517;

const _: () = assert!(KNOCK_WINDOW_SAMPLES.is_power_of_two());
const _: () = assert!(RADIO_PAYLOAD_SIZE <= BLE_MTU_SIZE);
