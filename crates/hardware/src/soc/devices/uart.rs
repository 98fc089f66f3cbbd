//! Universal Asynchronous Receiver-Transmitter (UART).
//!
//! Implements a 16550-compatible UART device for serial communication.
//! Handles the standard registers (RBR, THR, IER, IIR, FCR, LCR, MCR, LSR, MSR, SCR)
//! with the divisor latch multiplexed onto offsets 0 and 1 while `LCR.DLAB` is set.
//!
//! Received bytes are injected by an external stimulus into a 16-entry ring; a byte
//! arriving while the ring is full is dropped. A byte written to THR sits in the
//! holding register until the next `tick` moves it to the configured output, so
//! `LSR.THRE` is clear exactly while a byte is pending transmission.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::soc::devices::Device;

/// Receiver Buffer Register (Read) / Divisor Latch Low (DLAB=1).
const REG_RBR: u64 = 0;
/// Transmitter Holding Register (Write) / Divisor Latch Low (DLAB=1).
const REG_THR: u64 = 0;
/// Interrupt Enable Register / Divisor Latch High (DLAB=1).
const REG_IER: u64 = 1;
/// Interrupt Identity Register (Read).
const REG_IIR: u64 = 2;
/// FIFO Control Register (Write).
const REG_FCR: u64 = 2;
/// Line Control Register.
const REG_LCR: u64 = 3;
/// Modem Control Register.
const REG_MCR: u64 = 4;
/// Line Status Register.
const REG_LSR: u64 = 5;
/// Modem Status Register.
const REG_MSR: u64 = 6;
/// Scratch Register.
const REG_SCR: u64 = 7;

/// Interrupt Identity Register: No interrupt pending.
pub const IIR_NO_INTERRUPT: u8 = 0x01;
/// Interrupt Identity Register: Transmitter Holding Register Empty interrupt.
pub const IIR_THRE: u8 = 0x02;
/// Interrupt Identity Register: Receiver Data Available interrupt.
pub const IIR_RDA: u8 = 0x04;
/// Interrupt Identity Register: FIFOs enabled (bits 7:6).
const IIR_FIFO_ENABLED: u8 = 0xC0;

/// Line Status Register: Data ready bit (receiver has data).
pub const LSR_DATA_READY: u8 = 0x01;
/// Line Status Register: Overrun error (a received byte was dropped).
pub const LSR_OVERRUN: u8 = 0x02;
/// Line Status Register: Transmitter Holding Register Empty.
pub const LSR_THRE: u8 = 0x20;
/// Line Status Register: Transmitter Empty.
pub const LSR_TEMT: u8 = 0x40;

/// Line Control Register: Divisor Latch Access Bit.
pub const LCR_DLAB: u8 = 0x80;

/// Interrupt Enable Register: Receiver Data Available interrupt enable.
pub const IER_RDA: u8 = 0x01;
/// Interrupt Enable Register: Transmitter Holding Register Empty interrupt enable.
pub const IER_THRE: u8 = 0x02;
/// Writable IER bits.
const IER_MASK: u8 = 0x0F;

/// FIFO Control Register: clear receive FIFO.
const FCR_CLEAR_RX: u8 = 0x02;

/// Capacity of the receive ring.
pub const RX_FIFO_CAPACITY: usize = 16;
/// Size of the UART MMIO window.
pub const UART_SIZE: u64 = 0x100;
/// PLIC source the UART interrupt line is wired to.
pub const UART_IRQ: u32 = 10;

/// Threshold for flushing the host-side line buffer.
const TX_BUFFER_FLUSH_THRESHOLD: usize = 4096;

/// Where transmitted bytes go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UartOutput {
    /// Host standard output.
    #[default]
    Stdout,
    /// Host standard error.
    Stderr,
    /// An in-memory buffer drained with [`Uart::take_output`].
    Buffer,
}

/// Register block exposed for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UartSnapshot {
    /// Interrupt Enable Register.
    pub ier: u8,
    /// Interrupt Identity Register (as it would read, without side effects).
    pub iir: u8,
    /// Line Control Register.
    pub lcr: u8,
    /// Modem Control Register.
    pub mcr: u8,
    /// Line Status Register.
    pub lsr: u8,
    /// Modem Status Register.
    pub msr: u8,
    /// Scratch Register.
    pub scr: u8,
    /// Divisor latch.
    pub divisor: u16,
    /// Bytes waiting in the receive ring.
    pub rx_len: usize,
}

/// Fixed-capacity receive ring.
#[derive(Clone, Debug)]
struct RxFifo {
    buf: [u8; RX_FIFO_CAPACITY],
    head: usize,
    len: usize,
}

impl RxFifo {
    const fn new() -> Self {
        Self {
            buf: [0; RX_FIFO_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, byte: u8) -> bool {
        if self.len == RX_FIFO_CAPACITY {
            return false;
        }
        let tail = (self.head + self.len) % RX_FIFO_CAPACITY;
        self.buf[tail] = byte;
        self.len += 1;
        true
    }

    fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.buf[self.head];
        self.head = (self.head + 1) % RX_FIFO_CAPACITY;
        self.len -= 1;
        Some(byte)
    }

    fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

/// UART device structure.
pub struct Uart {
    base_addr: u64,
    rx: RxFifo,
    tx_holding: Option<u8>,
    ier: u8,
    lcr: u8,
    mcr: u8,
    scr: u8,
    div: u16,
    overrun: bool,
    /// THR-empty interrupt latched until IIR is read or THR is written.
    thre_ip: bool,
    output: UartOutput,
    tx_buffer: Vec<u8>,
}

impl Uart {
    /// Creates a new UART device.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - The base physical address of the UART device.
    /// * `output` - Destination for transmitted bytes.
    pub fn new(base_addr: u64, output: UartOutput) -> Self {
        Self {
            base_addr,
            rx: RxFifo::new(),
            tx_holding: None,
            ier: 0,
            lcr: 0,
            mcr: 0,
            scr: 0,
            div: 0,
            overrun: false,
            thre_ip: false,
            output,
            tx_buffer: Vec::new(),
        }
    }

    /// Pushes a received byte into the ring.
    ///
    /// # Returns
    ///
    /// `false` if the ring was full and the byte was dropped.
    pub fn inject_byte(&mut self, byte: u8) -> bool {
        if self.rx.push(byte) {
            return true;
        }
        self.overrun = true;
        warn!(byte, "uart: receive fifo full, dropping byte");
        false
    }

    /// Returns the number of bytes waiting in the receive ring.
    pub const fn rx_len(&self) -> usize {
        self.rx.len
    }

    /// Returns true while a byte sits in the transmit holding register.
    pub const fn tx_pending(&self) -> bool {
        self.tx_holding.is_some()
    }

    /// Returns true if the interrupt line to the PLIC is asserted.
    pub fn irq_asserted(&self) -> bool {
        self.pending_source() != IIR_NO_INTERRUPT
    }

    /// Takes everything transmitted so far in [`UartOutput::Buffer`] mode.
    pub fn take_output(&mut self) -> Vec<u8> {
        if self.output == UartOutput::Buffer {
            std::mem::take(&mut self.tx_buffer)
        } else {
            Vec::new()
        }
    }

    /// Captures the register block without read side effects.
    pub fn snapshot(&self) -> UartSnapshot {
        UartSnapshot {
            ier: self.ier,
            iir: IIR_FIFO_ENABLED | self.pending_source(),
            lcr: self.lcr,
            mcr: self.mcr,
            lsr: self.lsr(),
            msr: self.msr(),
            scr: self.scr,
            divisor: self.div,
            rx_len: self.rx.len,
        }
    }

    /// Highest-priority pending interrupt identity.
    fn pending_source(&self) -> u8 {
        if self.ier & IER_RDA != 0 && !self.rx.is_empty() {
            return IIR_RDA;
        }
        if self.ier & IER_THRE != 0 && self.thre_ip {
            return IIR_THRE;
        }
        IIR_NO_INTERRUPT
    }

    const fn dlab_set(&self) -> bool {
        self.lcr & LCR_DLAB != 0
    }

    fn lsr(&self) -> u8 {
        let mut lsr = 0;
        if !self.rx.is_empty() {
            lsr |= LSR_DATA_READY;
        }
        if self.overrun {
            lsr |= LSR_OVERRUN;
        }
        if self.tx_holding.is_none() {
            lsr |= LSR_THRE | LSR_TEMT;
        }
        lsr
    }

    /// Loopback reflects MCR outputs; otherwise report CTS and DSR asserted.
    const fn msr(&self) -> u8 {
        if self.mcr & 0x10 != 0 {
            (self.mcr & 0x0F) << 4
        } else {
            0x30
        }
    }

    fn read_iir(&mut self) -> u8 {
        let id = self.pending_source();
        if id == IIR_THRE {
            self.thre_ip = false;
        }
        IIR_FIFO_ENABLED | id
    }

    fn write_thr(&mut self, val: u8) {
        if let Some(prev) = self.tx_holding.replace(val) {
            self.emit(prev);
        }
        self.thre_ip = false;
    }

    fn write_ier(&mut self, val: u8) {
        let enabling_thre = val & IER_THRE != 0 && self.ier & IER_THRE == 0;
        self.ier = val & IER_MASK;
        if enabling_thre && self.tx_holding.is_none() {
            self.thre_ip = true;
        }
    }

    fn emit(&mut self, byte: u8) {
        self.tx_buffer.push(byte);
        if self.output != UartOutput::Buffer
            && (byte == b'\n' || self.tx_buffer.len() >= TX_BUFFER_FLUSH_THRESHOLD)
        {
            self.flush_buffer();
        }
    }

    /// Flushes the host-side line buffer to stdout or stderr.
    fn flush_buffer(&mut self) {
        if self.tx_buffer.is_empty() {
            return;
        }
        let result = match self.output {
            UartOutput::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(&self.tx_buffer).and_then(|()| out.flush())
            }
            UartOutput::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(&self.tx_buffer).and_then(|()| err.flush())
            }
            UartOutput::Buffer => return,
        };
        if let Err(e) = result {
            warn!(error = %e, "uart: host output failed");
        }
        self.tx_buffer.clear();
    }
}

impl Drop for Uart {
    /// Flushes any remaining output when the UART is dropped.
    fn drop(&mut self) {
        if let Some(byte) = self.tx_holding.take() {
            self.tx_buffer.push(byte);
        }
        self.flush_buffer();
    }
}

impl Device for Uart {
    fn name(&self) -> &str {
        "UART0"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, UART_SIZE)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        match offset {
            REG_RBR if self.dlab_set() => self.div as u8,
            REG_RBR => {
                let byte = self.rx.pop().unwrap_or(0);
                if self.rx.is_empty() {
                    self.overrun = false;
                }
                byte
            }
            REG_IER if self.dlab_set() => (self.div >> 8) as u8,
            REG_IER => self.ier,
            REG_IIR => self.read_iir(),
            REG_LCR => self.lcr,
            REG_MCR => self.mcr,
            REG_LSR => self.lsr(),
            REG_MSR => self.msr(),
            REG_SCR => self.scr,
            _ => {
                warn!(offset = format_args!("{offset:#x}"), "uart: read of unmapped offset");
                0
            }
        }
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        u16::from(self.read_u8(offset))
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        u32::from(self.read_u8(offset))
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        u64::from(self.read_u8(offset))
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        match offset {
            REG_THR if self.dlab_set() => self.div = (self.div & 0xFF00) | u16::from(val),
            REG_THR => self.write_thr(val),
            REG_IER if self.dlab_set() => {
                self.div = (self.div & 0x00FF) | (u16::from(val) << 8);
            }
            REG_IER => self.write_ier(val),
            REG_FCR => {
                if val & FCR_CLEAR_RX != 0 {
                    self.rx.clear();
                    self.overrun = false;
                }
            }
            REG_LCR => self.lcr = val,
            REG_MCR => self.mcr = val,
            REG_SCR => self.scr = val,
            REG_LSR | REG_MSR => {}
            _ => warn!(offset = format_args!("{offset:#x}"), "uart: write to unmapped offset"),
        }
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        self.write_u8(offset, val as u8);
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        self.write_u8(offset, val as u8);
    }

    fn write_u64(&mut self, offset: u64, val: u64) {
        self.write_u8(offset, val as u8);
    }

    /// Moves a pending THR byte to the output and latches the THR-empty interrupt.
    fn tick(&mut self) {
        if let Some(byte) = self.tx_holding.take() {
            self.emit(byte);
            if self.ier & IER_THRE != 0 {
                self.thre_ip = true;
            }
        }
    }

    fn reset(&mut self) {
        self.flush_buffer();
        self.rx.clear();
        self.tx_holding = None;
        self.ier = 0;
        self.lcr = 0;
        self.mcr = 0;
        self.scr = 0;
        self.div = 0;
        self.overrun = false;
        self.thre_ip = false;
    }
}
