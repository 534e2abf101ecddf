use bmp280_multibus::{Bmp280, Bmp280Bus, Calibration, Error, CHIP_ID};
use ehm::eh1::delay::NoopDelay;
use ehm::eh1::spi::{Mock, Transaction};

const COEF_REGS: [u8; 12] = [
    0x88, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E,
];

/// Calibration set from the datasheet compensation example.
const DATASHEET_COEF: [[u8; 2]; 12] = [
    [0x70, 0x6B], // T1 = 27504
    [0x43, 0x67], // T2 = 26435
    [0x18, 0xFC], // T3 = -1000
    [0x7D, 0x8E], // P1 = 36477
    [0x43, 0xD6], // P2 = -10685
    [0xD0, 0x0B], // P3 = 3024
    [0x27, 0x0B], // P4 = 2855
    [0x8C, 0x00], // P5 = 140
    [0xF9, 0xFF], // P6 = -7
    [0x8C, 0x3C], // P7 = 15500
    [0xF8, 0xC6], // P8 = -14600
    [0x70, 0x17], // P9 = 6000
];

/// Raw conversion results from the same datasheet example, left-justified in
/// the 24-bit data registers: UT = 519888, UP = 415148.
const UT_BYTES: [u8; 3] = [0x7E, 0xED, 0x00];
const UP_BYTES: [u8; 3] = [0x65, 0x5A, 0xC0];

fn exchange(cmd: &[u8], response: &[u8]) -> Vec<Transaction<u8>> {
    let mut tx = vec![
        Transaction::transaction_start(),
        Transaction::write_vec(cmd.to_vec()),
    ];
    if !response.is_empty() {
        tx.push(Transaction::read_vec(response.to_vec()));
    }
    tx.push(Transaction::transaction_end());
    tx
}

fn startup(coef: &[[u8; 2]; 12]) -> Vec<Transaction<u8>> {
    let mut tx = exchange(&[0xD0], &[0x58]);
    for (reg, data) in COEF_REGS.iter().zip(coef.iter()) {
        tx.extend(exchange(&[*reg], data));
    }
    tx
}

#[test]
fn startup_reads_id_then_coefficients() {
    let spi = Mock::new(&startup(&DATASHEET_COEF));
    let bmp = Bmp280::new(
        bmp280_multibus::spi1::Bmp280Bus::new(spi),
        NoopDelay::new(),
    )
    .unwrap();
    let (bus, _delay) = bmp.free();
    bus.free().done();
}

#[test]
fn chip_id_mismatch_stops_startup() {
    // The only expected transaction is the ID read; done() proves that no
    // coefficient register was touched after the mismatch.
    let mut spi = Mock::new(&exchange(&[0xD0], &[0x60]));
    let err = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).err().unwrap();
    assert_eq!(err, Error::ChipId(0x60));
    spi.done();
}

#[test]
fn coefficient_decode() {
    let coef: [[u8; 2]; 12] = [
        [0x34, 0x12], // t1, unsigned
        [0x18, 0xFC], // t2, negative
        [0xFF, 0xFF], // t3, negative
        [0xFF, 0xFF], // p1, unsigned: same bytes as t3, different value
        [0x00, 0x80], // p2, most negative
        [0xFF, 0x7F], // p3, most positive
        [0x00, 0x00],
        [0x00, 0x00],
        [0x00, 0x00],
        [0x00, 0x00],
        [0x00, 0x00],
        [0x00, 0x00],
    ];
    let mut spi = Mock::new(&startup(&coef));
    let bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    assert_eq!(
        bmp.coefficients(),
        Calibration {
            t1: 4660.0,
            t2: -1000.0,
            t3: -1.0,
            p1: 65535.0,
            p2: -32768.0,
            p3: 32767.0,
            p4: 0.0,
            p5: 0.0,
            p6: 0.0,
            p7: 0.0,
            p8: 0.0,
            p9: 0.0,
        }
    );
    spi.done();
}

#[test]
fn accessors_unset_before_first_measurement() {
    let mut spi = Mock::new(&startup(&DATASHEET_COEF));
    let bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    assert_eq!(bmp.temperature(), None);
    assert_eq!(bmp.pressure(), None);
    assert_eq!(bmp.pressure_mbar(), None);
    spi.done();
}

#[test]
fn golden_measurement() {
    let mut tx = startup(&DATASHEET_COEF);
    tx.extend(exchange(&[0x74, 0xFE], &[]));
    tx.extend(exchange(&[0xF3], &[0x00]));
    tx.extend(exchange(&[0xFA], &UT_BYTES));
    tx.extend(exchange(&[0xF7], &UP_BYTES));
    let mut spi = Mock::new(&tx);
    let mut bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    let (celsius, pascal) = bmp.read_measurement().unwrap();
    assert!((celsius - 25.082421875).abs() < 1e-3, "celsius = {celsius}");
    assert!((pascal - 100653.00897415778).abs() < 1e-3, "pascal = {pascal}");
    assert_eq!(bmp.temperature(), Some(celsius));
    assert_eq!(bmp.pressure(), Some(pascal));
    spi.done();
}

#[test]
fn mbar_uses_the_acquisition_constant() {
    let mut tx = startup(&DATASHEET_COEF);
    tx.extend(exchange(&[0x74, 0xFE], &[]));
    tx.extend(exchange(&[0xF3], &[0x00]));
    tx.extend(exchange(&[0xFA], &UT_BYTES));
    tx.extend(exchange(&[0xF7], &UP_BYTES));
    let mut spi = Mock::new(&tx);
    let mut bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    let (_celsius, pascal) = bmp.read_measurement().unwrap();
    let mbar = bmp.pressure_mbar().unwrap();
    assert_eq!(mbar, 1000.0 * (pascal / 1.013e2));
    assert_ne!(mbar, 1000.0 * (pascal / 1013.25));
    spi.done();
}

#[test]
fn poll_loop_reads_status_until_ready() {
    // Three "measuring" polls, then ready: exactly four status reads must
    // happen before the data registers are read.
    let mut tx = startup(&DATASHEET_COEF);
    tx.extend(exchange(&[0x74, 0xFE], &[]));
    for _ in 0..3 {
        tx.extend(exchange(&[0xF3], &[0x08]));
    }
    tx.extend(exchange(&[0xF3], &[0x00]));
    tx.extend(exchange(&[0xFA], &UT_BYTES));
    tx.extend(exchange(&[0xF7], &UP_BYTES));
    let mut spi = Mock::new(&tx);
    let mut bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    bmp.read_measurement().unwrap();
    spi.done();
}

#[test]
fn degenerate_coefficients_report_pressure_unavailable() {
    // All-zero coefficients zero the pressure divider.  The call must not
    // divide by zero; the temperature from the same conversion stays cached.
    let mut tx = startup(&[[0x00, 0x00]; 12]);
    tx.extend(exchange(&[0x74, 0xFE], &[]));
    tx.extend(exchange(&[0xF3], &[0x00]));
    tx.extend(exchange(&[0xFA], &UT_BYTES));
    tx.extend(exchange(&[0xF7], &UP_BYTES));
    let mut spi = Mock::new(&tx);
    let mut bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    assert_eq!(bmp.read_measurement().unwrap_err(), Error::Pressure);
    assert_eq!(bmp.temperature(), Some(0.0));
    assert_eq!(bmp.pressure(), None);
    assert_eq!(bmp.pressure_mbar(), None);
    spi.done();
}

#[test]
fn chip_id_and_status_passthrough() {
    let mut tx = startup(&DATASHEET_COEF);
    tx.extend(exchange(&[0xD0], &[0x58]));
    tx.extend(exchange(&[0xF3], &[0x09]));
    let mut spi = Mock::new(&tx);
    let mut bmp = Bmp280::from_spi1(spi.clone(), NoopDelay::new()).unwrap();
    assert_eq!(bmp.chip_id().unwrap(), CHIP_ID);
    let status = bmp.status().unwrap();
    assert!(status.measuring());
    assert!(status.im_update());
    spi.done();
}

#[test]
fn read_u16_is_little_endian() {
    let spi = Mock::new(&exchange(&[0x88], &[0x34, 0x12]));
    let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    assert_eq!(bus.read_u16(0x88).unwrap(), 0x1234);
    bus.free().done();
}

#[test]
fn read_s16_reinterprets_twos_complement() {
    let mut tx = exchange(&[0x8A], &[0xFF, 0x7F]);
    tx.extend(exchange(&[0x8A], &[0x00, 0x80]));
    tx.extend(exchange(&[0x8A], &[0x18, 0xFC]));
    let spi = Mock::new(&tx);
    let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    assert_eq!(bus.read_s16(0x8A).unwrap(), 32767);
    assert_eq!(bus.read_s16(0x8A).unwrap(), -32768);
    assert_eq!(bus.read_s16(0x8A).unwrap(), -1000);
    bus.free().done();
}

#[test]
fn read_u24_drops_the_low_nibble() {
    let mut tx = exchange(&[0xFA], &[0x12, 0x34, 0x56]);
    tx.extend(exchange(&[0xFA], &[0xFF, 0xFF, 0xFF]));
    let spi = Mock::new(&tx);
    let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    assert_eq!(bus.read_u24(0xFA).unwrap(), 0x12345);
    assert_eq!(bus.read_u24(0xFA).unwrap(), 0xFFFFF);
    bus.free().done();
}

#[test]
fn read_sets_the_read_bit_on_the_address() {
    // 0x50 has the read bit clear; on the wire it must become 0xD0.
    let spi = Mock::new(&exchange(&[0xD0], &[0xAB]));
    let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    assert_eq!(bus.read_u8(0x50).unwrap(), 0xAB);
    bus.free().done();
}
