//! BMP280 driver with support for multiple embedded-hal SPI versions.
//!
//! The BMP280 is sampled in forced mode only: every call to
//! [`Bmp280::read_measurement`] commands a single high-resolution conversion,
//! waits for it to finish, and compensates the raw readings with the
//! calibration coefficients read from the chip at startup.
//!
//! # Example
//!
//! ```
//! # let mut tx = vec![
//! #     ehm::eh1::spi::Transaction::transaction_start(),
//! #     ehm::eh1::spi::Transaction::write(0xD0),
//! #     ehm::eh1::spi::Transaction::read(0x58),
//! #     ehm::eh1::spi::Transaction::transaction_end(),
//! # ];
//! # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
//! #     tx.extend([
//! #         ehm::eh1::spi::Transaction::transaction_start(),
//! #         ehm::eh1::spi::Transaction::write(reg),
//! #         ehm::eh1::spi::Transaction::read_vec(vec![u8::from(reg == 0x8E), 0]),
//! #         ehm::eh1::spi::Transaction::transaction_end(),
//! #     ]);
//! # }
//! # tx.extend([
//! #     ehm::eh1::spi::Transaction::transaction_start(),
//! #     ehm::eh1::spi::Transaction::write_vec(vec![0x74, 0xFE]),
//! #     ehm::eh1::spi::Transaction::transaction_end(),
//! #     ehm::eh1::spi::Transaction::transaction_start(),
//! #     ehm::eh1::spi::Transaction::write(0xF3),
//! #     ehm::eh1::spi::Transaction::read(0x00),
//! #     ehm::eh1::spi::Transaction::transaction_end(),
//! #     ehm::eh1::spi::Transaction::transaction_start(),
//! #     ehm::eh1::spi::Transaction::write(0xFA),
//! #     ehm::eh1::spi::Transaction::read_vec(vec![0, 0, 0]),
//! #     ehm::eh1::spi::Transaction::transaction_end(),
//! #     ehm::eh1::spi::Transaction::transaction_start(),
//! #     ehm::eh1::spi::Transaction::write(0xF7),
//! #     ehm::eh1::spi::Transaction::read_vec(vec![0, 0, 0]),
//! #     ehm::eh1::spi::Transaction::transaction_end(),
//! # ]);
//! # let spi = ehm::eh1::spi::Mock::new(&tx);
//! use bmp280_multibus::Bmp280;
//!
//! let mut bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
//! let (celsius, pascal) = bmp.read_measurement()?;
//! # let (bus, _delay) = bmp.free();
//! # bus.free().done();
//! # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
//! ```
//!
//! # Features
//!
//! * `async`: Enable asynchronous implementations with `embedded-hal-async`.
//! * `serde`: Implement `Serialize` and `Deserialize` for [`Calibration`].
#![no_std]
#![cfg_attr(feature = "async", allow(async_fn_in_trait))]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use eh0;
pub use eh1;
#[cfg(feature = "async")]
pub use eha1;

/// BMP280 SPI bus implementation with embedded-hal version 0.2
pub mod spi0;
/// BMP280 SPI bus implementation with embedded-hal version 1
pub mod spi1;

/// BMP280 chip ID.
pub const CHIP_ID: u8 = 0x58;

/// Maximum SPI bus frequency in hertz.
pub const SPI_MAX_FREQ: u32 = 10_000_000;

/// ctrl_meas value for one conversion: ×16 oversampling on both channels,
/// forced mode.
const CTRL_FORCED: u8 = 0xFE;

/// Interval between status polls while a conversion is running.
const POLL_INTERVAL_MS: u32 = 10;

/// Register addresses.
///
/// from Table 18: Memory Map
#[allow(dead_code)]
mod reg {
    pub const TEMP_MSB: u8 = 0xFA;
    pub const PRESS_MSB: u8 = 0xF7;
    pub const CONFIG: u8 = 0xF5;
    pub const CTRL_MEAS: u8 = 0xF4;
    pub const STATUS: u8 = 0xF3;
    pub const ID: u8 = 0xD0;
    pub const T1: u8 = 0x88;
    pub const T2: u8 = 0x8A;
    pub const T3: u8 = 0x8C;
    pub const P1: u8 = 0x8E;
    pub const P2: u8 = 0x90;
    pub const P3: u8 = 0x92;
    pub const P4: u8 = 0x94;
    pub const P5: u8 = 0x96;
    pub const P6: u8 = 0x98;
    pub const P7: u8 = 0x9A;
    pub const P8: u8 = 0x9C;
    pub const P9: u8 = 0x9E;
}

/// BMP280 calibration coefficients.
///
/// Programmed into the chip at manufacture time and read back once during
/// driver construction.  Stored as `f64` because that is what the
/// compensation formulas consume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct Calibration {
    pub t1: f64, // 0x88..0x89 unsigned
    pub t2: f64, // 0x8A..0x8B signed
    pub t3: f64, // 0x8C..0x8D signed
    pub p1: f64, // 0x8E..0x8F unsigned
    pub p2: f64, // 0x90..0x91 signed
    pub p3: f64, // 0x92..0x93 signed
    pub p4: f64, // 0x94..0x95 signed
    pub p5: f64, // 0x96..0x97 signed
    pub p6: f64, // 0x98..0x99 signed
    pub p7: f64, // 0x9A..0x9B signed
    pub p8: f64, // 0x9C..0x9D signed
    pub p9: f64, // 0x9E..0x9F signed
}

impl Calibration {
    // The magic numbers in both compensation routines come straight from the
    // datasheet formulas; term order matters, keep it.

    /// Returns `(t_fine, celsius)`.  `t_fine` is also an input to the
    /// pressure compensation.
    fn compensate_temperature(&self, ut: f64) -> (f64, f64) {
        let var1: f64 = (ut / 16384.0 - self.t1 / 1024.0) * self.t2;
        let var2: f64 =
            (ut / 131072.0 - self.t1 / 8192.0) * (ut / 131072.0 - self.t1 / 8192.0) * self.t3;
        let t_fine: f64 = (var1 + var2) as i64 as f64;
        (t_fine, t_fine / 5120.0)
    }

    /// Pressure in pascal, or `None` when the divider term evaluates to
    /// zero.
    fn compensate_pressure(&self, t_fine: f64, up: f64) -> Option<f64> {
        let var1: f64 = t_fine / 2.0 - 64000.0;
        let var2: f64 = var1 * var1 * self.p6 / 32768.0;
        let var2: f64 = var2 + var1 * self.p5 * 2.0;
        let var2: f64 = var2 / 4.0 + self.p4 * 65536.0;
        // NB: the datasheet gives 524288.0 for the two divisors below.
        let var1: f64 = (self.p3 * var1 * var1 / 534288.0 + self.p2 * var1) / 534288.0;
        let var1: f64 = (1.0 + var1 / 32768.0) * self.p1;
        if var1 == 0.0 {
            return None;
        }
        let p: f64 = 1048576.0 - up;
        let p: f64 = ((p - var2 / 4096.0) * 6250.0) / var1;
        let var1: f64 = self.p9 * p * p / 2147483648.0;
        let var2: f64 = p * self.p8 / 32768.0;
        Some(p + (var1 + var2 + self.p7) / 16.0)
    }
}

/// Status register
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Status(u8);

impl Status {
    /// Reset value of the status register.
    pub const RESET: Self = Status(0x00);

    /// Measuring field.
    ///
    /// Automatically set to `true` whenever a conversion is running and back
    /// to `false` when the results have been transferred to the data
    /// registers.
    ///
    /// # Example
    ///
    /// ```
    /// assert!(!bmp280_multibus::Status::RESET.measuring());
    /// ```
    pub const fn measuring(&self) -> bool {
        self.0 & (1 << 3) != 0
    }

    /// im_update field.
    ///
    /// Automatically set to `true` when the NVM data are being copied to
    /// image registers and back to `false` when the copying is done.
    ///
    /// # Example
    ///
    /// ```
    /// assert!(!bmp280_multibus::Status::RESET.im_update());
    /// ```
    pub const fn im_update(&self) -> bool {
        self.0 & 1 != 0
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::RESET
    }
}

/// Driver error.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<B> {
    /// Bus error wrapper.
    Bus(B),
    /// The ID register did not contain [`CHIP_ID`].
    ///
    /// Contains the value that was actually read.  Returned by the
    /// constructors before any coefficient register is touched.
    ChipId(u8),
    /// The pressure compensation divider evaluated to zero.
    ///
    /// The pressure reading of this call is unavailable; the temperature
    /// reading is valid and remains cached.
    Pressure,
}

impl<B> From<B> for Error<B> {
    #[inline]
    fn from(b: B) -> Self {
        Error::Bus(b)
    }
}

/// BMP280 bus.
pub trait Bmp280Bus {
    /// BMP280 bus error.
    type Error;

    /// Execute one bus transaction: write all of `cmd`, then read
    /// `buf.len()` response bytes into `buf`.
    ///
    /// The two phases must form a single transaction, chip select asserted
    /// across both, with no other transaction interleaved.  `buf` may be
    /// empty for write-only transfers such as control register writes.
    ///
    /// ```text
    /// Read example (BMP280 Datasheet Figure 10: SPI multiple byte read)
    /// +-------+----+------------------+---------------+
    /// | Start | RW | Register Address | Register Data |
    /// +-------+----+------------------+---------------+
    /// | CSB=0 |  1 | xxxxxxx          | xxxxxxxx      |
    /// +-------+----+------------------+---------------+
    ///
    ///     +---------------+-------+
    /// ... | Register Data | Stop  |
    ///     +---------------+-------+
    /// ... | xxxxxxxx      | CSB=1 |
    ///     +---------------+-------+
    /// ```
    fn exchange(&mut self, cmd: &[u8], buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read an unsigned 8-bit value from a register.
    ///
    /// The read bit (`0x80`) is set on the address byte before it goes out
    /// on the wire.
    fn read_u8(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0];
        self.exchange(&[reg | (1 << 7)], &mut buf)?;
        Ok(buf[0])
    }

    /// Read an unsigned 16-bit value from a register pair.
    ///
    /// Coefficient register pairs are little-endian, low byte first in the
    /// response.
    ///
    /// # Example
    ///
    /// ```
    /// # let spi = ehm::eh1::spi::Mock::new(&[
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0x88),
    /// #     ehm::eh1::spi::Transaction::read_vec(vec![0x34, 0x12]),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ]);
    /// use bmp280_multibus::Bmp280Bus;
    ///
    /// let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    /// assert_eq!(bus.read_u16(0x88)?, 0x1234);
    /// # bus.free().done();
    /// # Ok::<(), eh1::spi::ErrorKind>(())
    /// ```
    fn read_u16(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf: [u8; 2] = [0; 2];
        self.exchange(&[reg | (1 << 7)], &mut buf)?;
        Ok(u16::from_le_bytes([buf[0], buf[1]]))
    }

    /// Read a signed 16-bit value from a register pair.
    fn read_s16(&mut self, reg: u8) -> Result<i16, Self::Error> {
        Ok(self.read_u16(reg)? as i16)
    }

    /// Read a 20-bit data register burst.
    ///
    /// The three data bytes arrive most-significant first, and the
    /// measurement occupies the top 20 of the 24 bits; the low nibble is
    /// discarded.
    ///
    /// # Example
    ///
    /// ```
    /// # let spi = ehm::eh1::spi::Mock::new(&[
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xFA),
    /// #     ehm::eh1::spi::Transaction::read_vec(vec![0x12, 0x34, 0x56]),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ]);
    /// use bmp280_multibus::Bmp280Bus;
    ///
    /// let mut bus = bmp280_multibus::spi1::Bmp280Bus::new(spi);
    /// assert_eq!(bus.read_u24(0xFA)?, 0x12345);
    /// # bus.free().done();
    /// # Ok::<(), eh1::spi::ErrorKind>(())
    /// ```
    fn read_u24(&mut self, reg: u8) -> Result<u32, Self::Error> {
        let mut buf: [u8; 3] = [0; 3];
        self.exchange(&[reg | (1 << 7)], &mut buf)?;
        Ok((u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2])) >> 4)
    }

    /// Read the calibration coefficients from the chip.
    ///
    /// Each coefficient is read as its own 2-byte transaction.  Reading the
    /// whole table in one burst failed on real hardware; do not change this
    /// back to a bulk read.
    fn calibration(&mut self) -> Result<Calibration, Self::Error> {
        Ok(Calibration {
            t1: f64::from(self.read_u16(reg::T1)?),
            t2: f64::from(self.read_s16(reg::T2)?),
            t3: f64::from(self.read_s16(reg::T3)?),
            p1: f64::from(self.read_u16(reg::P1)?),
            p2: f64::from(self.read_s16(reg::P2)?),
            p3: f64::from(self.read_s16(reg::P3)?),
            p4: f64::from(self.read_s16(reg::P4)?),
            p5: f64::from(self.read_s16(reg::P5)?),
            p6: f64::from(self.read_s16(reg::P6)?),
            p7: f64::from(self.read_s16(reg::P7)?),
            p8: f64::from(self.read_s16(reg::P8)?),
            p9: f64::from(self.read_s16(reg::P9)?),
        })
    }
}

/// Asynchronous BMP280 bus.
#[cfg(feature = "async")]
pub trait Bmp280BusAsync {
    /// BMP280 bus error.
    type Error;

    /// Execute one bus transaction.
    ///
    /// See [`Bmp280Bus::exchange`] for more information.
    async fn exchange(&mut self, cmd: &[u8], buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read an unsigned 8-bit value from a register.
    async fn read_u8(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0];
        self.exchange(&[reg | (1 << 7)], &mut buf).await?;
        Ok(buf[0])
    }

    /// Read an unsigned 16-bit value from a register pair.
    async fn read_u16(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf: [u8; 2] = [0; 2];
        self.exchange(&[reg | (1 << 7)], &mut buf).await?;
        Ok(u16::from_le_bytes([buf[0], buf[1]]))
    }

    /// Read a signed 16-bit value from a register pair.
    async fn read_s16(&mut self, reg: u8) -> Result<i16, Self::Error> {
        Ok(self.read_u16(reg).await? as i16)
    }

    /// Read a 20-bit data register burst.
    async fn read_u24(&mut self, reg: u8) -> Result<u32, Self::Error> {
        let mut buf: [u8; 3] = [0; 3];
        self.exchange(&[reg | (1 << 7)], &mut buf).await?;
        Ok((u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2])) >> 4)
    }

    /// Read the calibration coefficients from the chip.
    ///
    /// See [`Bmp280Bus::calibration`] for more information.
    async fn calibration(&mut self) -> Result<Calibration, Self::Error> {
        Ok(Calibration {
            t1: f64::from(self.read_u16(reg::T1).await?),
            t2: f64::from(self.read_s16(reg::T2).await?),
            t3: f64::from(self.read_s16(reg::T3).await?),
            p1: f64::from(self.read_u16(reg::P1).await?),
            p2: f64::from(self.read_s16(reg::P2).await?),
            p3: f64::from(self.read_s16(reg::P3).await?),
            p4: f64::from(self.read_s16(reg::P4).await?),
            p5: f64::from(self.read_s16(reg::P5).await?),
            p6: f64::from(self.read_s16(reg::P6).await?),
            p7: f64::from(self.read_s16(reg::P7).await?),
            p8: f64::from(self.read_s16(reg::P8).await?),
            p9: f64::from(self.read_s16(reg::P9).await?),
        })
    }
}

/// BMP280 driver.
///
/// Generic over the bus `B` and the delay provider `D` used to pace the
/// status poll loop while a conversion is running.
#[derive(Debug)]
pub struct Bmp280<B, D> {
    bus: B,
    delay: D,
    cal: Calibration,
    temp: Option<f64>,
    press: Option<f64>,
}

impl<B, D> Bmp280<B, D> {
    /// Free the bus and delay provider from the BMP280.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::Bmp280;
    ///
    /// let bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
    /// let (bus, delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    #[inline]
    pub fn free(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Calibration coefficients, as read at construction.
    ///
    /// Useful for diagnostics; the values never change over the lifetime of
    /// the driver.
    #[inline]
    pub fn coefficients(&self) -> Calibration {
        self.cal
    }

    /// The last measured temperature in °C.
    ///
    /// `None` until the first successful [`read_measurement`] call.
    ///
    /// [`read_measurement`]: Bmp280::read_measurement
    #[inline]
    pub fn temperature(&self) -> Option<f64> {
        self.temp
    }

    /// The last measured pressure in pascal.
    ///
    /// `None` until the first successful [`read_measurement`] call.
    ///
    /// [`read_measurement`]: Bmp280::read_measurement
    #[inline]
    pub fn pressure(&self) -> Option<f64> {
        self.press
    }

    /// The last measured pressure in mbar.
    ///
    /// Derived from the cached pascal value as `1000 * (pressure / 1.013e2)`.
    #[inline]
    pub fn pressure_mbar(&self) -> Option<f64> {
        self.press.map(|press| 1000.0 * (press / 1.013e2))
    }
}

impl<SPI, CS, D, SpiError, PinError> Bmp280<crate::spi0::Bmp280Bus<SPI, CS>, D>
where
    SPI: eh0::blocking::spi::Transfer<u8, Error = SpiError>
        + eh0::blocking::spi::Write<u8, Error = SpiError>,
    CS: eh0::digital::v2::OutputPin<Error = PinError>,
    D: eh1::delay::DelayNs,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 0.2 SPI
    /// peripheral and a chip select digital I/O pin.
    ///
    /// The chip select pin must be high before being passed to this
    /// function.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut spi_tx = vec![
    /// #     ehm::eh0::spi::Transaction::write(vec![0xD0]),
    /// #     ehm::eh0::spi::Transaction::transfer(vec![0], vec![0x58]),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     spi_tx.push(ehm::eh0::spi::Transaction::write(vec![reg]));
    /// #     spi_tx.push(ehm::eh0::spi::Transaction::transfer(vec![0, 0], vec![0, 0]));
    /// # }
    /// # let spi = ehm::eh0::spi::Mock::new(&spi_tx);
    /// # let mut pin_tx = vec![ehm::eh0::digital::Transaction::set(ehm::eh0::digital::State::High)];
    /// # for _ in 0..13 {
    /// #     pin_tx.push(ehm::eh0::digital::Transaction::set(ehm::eh0::digital::State::Low));
    /// #     pin_tx.push(ehm::eh0::digital::Transaction::set(ehm::eh0::digital::State::High));
    /// # }
    /// # let mut pin = ehm::eh0::digital::Mock::new(&pin_tx);
    /// use bmp280_multibus::Bmp280;
    /// use eh0::digital::v2::OutputPin;
    ///
    /// pin.set_high().unwrap();
    /// let bmp: Bmp280<_, _> = Bmp280::from_spi0(spi, pin, ehm::eh1::delay::NoopDelay::new())?;
    /// # let (bus, _delay) = bmp.free();
    /// # let (mut spi, mut pin) = bus.free();
    /// # spi.done(); pin.done();
    /// # Ok::<(), bmp280_multibus::Error<bmp280_multibus::spi0::Error<ehm::eh0::MockError, ehm::eh0::MockError>>>(())
    /// ```
    pub fn from_spi0(
        spi: SPI,
        cs: CS,
        delay: D,
    ) -> Result<Self, Error<crate::spi0::Error<SpiError, PinError>>> {
        Self::new(crate::spi0::Bmp280Bus::new(spi, cs), delay)
    }
}

impl<SPI, D, E> Bmp280<crate::spi1::Bmp280Bus<SPI>, D>
where
    SPI: eh1::spi::SpiDevice<Error = E>,
    D: eh1::delay::DelayNs,
{
    /// Creates a new `Bmp280` driver from an embedded-hal version 1 SPI
    /// device.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::Bmp280;
    ///
    /// let bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    pub fn from_spi1(spi: SPI, delay: D) -> Result<Self, Error<E>> {
        Self::new(crate::spi1::Bmp280Bus::new(spi), delay)
    }
}

impl<B, D, E> Bmp280<B, D>
where
    B: Bmp280Bus<Error = E>,
    D: eh1::delay::DelayNs,
{
    /// Create a new BMP280 from a [`Bmp280Bus`].
    ///
    /// The ID register is checked first; anything other than [`CHIP_ID`]
    /// fails with [`Error::ChipId`] before any coefficient is read.  The 12
    /// calibration coefficients are then read from the chip, one register
    /// pair per transaction.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::{spi1::Bmp280Bus, Bmp280};
    ///
    /// let bus: Bmp280Bus<_> = Bmp280Bus::new(spi);
    /// let bmp: Bmp280<_, _> = Bmp280::new(bus, ehm::eh1::delay::NoopDelay::new())?;
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    pub fn new(mut bus: B, delay: D) -> Result<Self, Error<E>> {
        let id: u8 = bus.read_u8(reg::ID)?;
        if id != CHIP_ID {
            return Err(Error::ChipId(id));
        }
        let cal: Calibration = bus.calibration()?;
        Ok(Self {
            bus,
            delay,
            cal,
            temp: None,
            press: None,
        })
    }

    /// BMP280 chip ID.
    ///
    /// The return value is a constant, [`CHIP_ID`]; the constructor has
    /// already verified it once.  This register is useful as a sanity check
    /// to ensure communications are working with the BMP280.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # tx.extend([
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ]);
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::{Bmp280, CHIP_ID};
    ///
    /// let mut bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
    /// let chip_id: u8 = bmp.chip_id()?;
    /// assert_eq!(chip_id, CHIP_ID);
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    pub fn chip_id(&mut self) -> Result<u8, E> {
        self.bus.read_u8(reg::ID)
    }

    /// Get the status of the device.
    ///
    /// # Example
    ///
    /// Check if a conversion is running.
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # tx.extend([
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xF3),
    /// #     ehm::eh1::spi::Transaction::read(0x00),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ]);
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::{Bmp280, Status};
    ///
    /// let mut bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
    /// let status: Status = bmp.status()?;
    /// assert!(!status.measuring());
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    pub fn status(&mut self) -> Result<Status, E> {
        Ok(Status(self.bus.read_u8(reg::STATUS)?))
    }

    /// Run one forced-mode conversion and return `(celsius, pascal)`.
    ///
    /// Commands a single high-resolution conversion, polls the status
    /// register until the measuring bit clears (re-checking every 10 ms),
    /// then reads and compensates the raw temperature and pressure.  Both
    /// values are cached for the [`temperature`], [`pressure`], and
    /// [`pressure_mbar`] accessors.
    ///
    /// The poll loop has no timeout; a conversion that never clears the
    /// measuring bit blocks the caller.
    ///
    /// [`temperature`]: Bmp280::temperature
    /// [`pressure`]: Bmp280::pressure
    /// [`pressure_mbar`]: Bmp280::pressure_mbar
    ///
    /// # Example
    ///
    /// ```
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![u8::from(reg == 0x8E), 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # tx.extend([
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write_vec(vec![0x74, 0xFE]),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xF3),
    /// #     ehm::eh1::spi::Transaction::read(0x00),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xFA),
    /// #     ehm::eh1::spi::Transaction::read_vec(vec![0, 0, 0]),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xF7),
    /// #     ehm::eh1::spi::Transaction::read_vec(vec![0, 0, 0]),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ]);
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::Bmp280;
    ///
    /// let mut bmp: Bmp280<_, _> = Bmp280::from_spi1(spi, ehm::eh1::delay::NoopDelay::new())?;
    /// let (celsius, pascal) = bmp.read_measurement()?;
    /// assert_eq!(bmp.temperature(), Some(celsius));
    /// assert_eq!(bmp.pressure(), Some(pascal));
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done();
    /// # Ok::<(), bmp280_multibus::Error<eh1::spi::ErrorKind>>(())
    /// ```
    pub fn read_measurement(&mut self) -> Result<(f64, f64), Error<E>> {
        // One measurement in high resolution, forced mode.
        self.bus
            .exchange(&[reg::CTRL_MEAS & !(1 << 7), CTRL_FORCED], &mut [])?;
        while self.status()?.measuring() {
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }
        let ut: f64 = f64::from(self.bus.read_u24(reg::TEMP_MSB)?);
        let (t_fine, celsius) = self.cal.compensate_temperature(ut);
        self.temp = Some(celsius);
        let up: f64 = f64::from(self.bus.read_u24(reg::PRESS_MSB)?);
        let pascal: f64 = self
            .cal
            .compensate_pressure(t_fine, up)
            .ok_or(Error::Pressure)?;
        self.press = Some(pascal);
        Ok((celsius, pascal))
    }
}

#[cfg(feature = "async")]
impl<SPI, D, E> Bmp280<crate::spi1::Bmp280Bus<SPI>, D>
where
    SPI: eha1::spi::SpiDevice<Error = E>,
    D: eha1::delay::DelayNs,
{
    /// Creates a new `Bmp280` driver from an embedded-hal-async SPI device.
    ///
    /// # Example
    ///
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), bmp280_multibus::Error<eh1::spi::ErrorKind>> {
    /// # let mut tx = vec![
    /// #     ehm::eh1::spi::Transaction::transaction_start(),
    /// #     ehm::eh1::spi::Transaction::write(0xD0),
    /// #     ehm::eh1::spi::Transaction::read(0x58),
    /// #     ehm::eh1::spi::Transaction::transaction_end(),
    /// # ];
    /// # for reg in [0x88u8, 0x8A, 0x8C, 0x8E, 0x90, 0x92, 0x94, 0x96, 0x98, 0x9A, 0x9C, 0x9E] {
    /// #     tx.extend([
    /// #         ehm::eh1::spi::Transaction::transaction_start(),
    /// #         ehm::eh1::spi::Transaction::write(reg),
    /// #         ehm::eh1::spi::Transaction::read_vec(vec![0, 0]),
    /// #         ehm::eh1::spi::Transaction::transaction_end(),
    /// #     ]);
    /// # }
    /// # let spi = ehm::eh1::spi::Mock::new(&tx);
    /// use bmp280_multibus::Bmp280;
    ///
    /// let bmp: Bmp280<_, _> =
    ///     Bmp280::from_spi1_async(spi, ehm::eh1::delay::NoopDelay::new()).await?;
    /// # let (bus, _delay) = bmp.free();
    /// # bus.free().done(); Ok(()) }
    /// ```
    pub async fn from_spi1_async(spi: SPI, delay: D) -> Result<Self, Error<E>> {
        Self::new_async(crate::spi1::Bmp280Bus::new(spi), delay).await
    }
}

#[cfg(feature = "async")]
impl<B, D, E> Bmp280<B, D>
where
    B: Bmp280BusAsync<Error = E>,
    D: eha1::delay::DelayNs,
{
    /// Create a new BMP280 from a [`Bmp280BusAsync`].
    ///
    /// See [`Bmp280::new`] for more information.
    pub async fn new_async(mut bus: B, delay: D) -> Result<Self, Error<E>> {
        let id: u8 = bus.read_u8(reg::ID).await?;
        if id != CHIP_ID {
            return Err(Error::ChipId(id));
        }
        let cal: Calibration = bus.calibration().await?;
        Ok(Self {
            bus,
            delay,
            cal,
            temp: None,
            press: None,
        })
    }

    /// BMP280 chip ID.
    ///
    /// See [`Bmp280::chip_id`] for more information.
    pub async fn chip_id_async(&mut self) -> Result<u8, E> {
        self.bus.read_u8(reg::ID).await
    }

    /// Get the status of the device.
    ///
    /// See [`Bmp280::status`] for more information.
    pub async fn status_async(&mut self) -> Result<Status, E> {
        Ok(Status(self.bus.read_u8(reg::STATUS).await?))
    }

    /// Run one forced-mode conversion and return `(celsius, pascal)`.
    ///
    /// See [`Bmp280::read_measurement`] for more information.  This variant
    /// suspends instead of blocking while it waits for the conversion to
    /// finish; the status register is re-checked after every wait.
    pub async fn read_measurement_async(&mut self) -> Result<(f64, f64), Error<E>> {
        self.bus
            .exchange(&[reg::CTRL_MEAS & !(1 << 7), CTRL_FORCED], &mut [])
            .await?;
        while self.status_async().await?.measuring() {
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }
        let ut: f64 = f64::from(self.bus.read_u24(reg::TEMP_MSB).await?);
        let (t_fine, celsius) = self.cal.compensate_temperature(ut);
        self.temp = Some(celsius);
        let up: f64 = f64::from(self.bus.read_u24(reg::PRESS_MSB).await?);
        let pascal: f64 = self
            .cal
            .compensate_pressure(t_fine, up)
            .ok_or(Error::Pressure)?;
        self.press = Some(pascal);
        Ok((celsius, pascal))
    }
}
