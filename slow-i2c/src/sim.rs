//! Simulated I2C bus for host tests
//!
//! Models two pulled-up open-drain lines, a virtual microsecond clock and an
//! optional slave device. The slave reacts to every edge on the effective line
//! levels, so anything the master does wrong shows up as a missed bit, a
//! spurious START/STOP or a failed acknowledge.

use {
    crate::{
        platform::{PinMode, Platform},
        Instant,
    },
    embedded_hal::digital::PinState,
    std::collections::VecDeque,
};

pub(crate) const SDA: u8 = 4;
pub(crate) const SCL: u8 = 5;

/// Bus condition seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Condition {
    /// SDA fell while SCL was high
    Start,
    /// SDA rose while SCL was high
    Stop,
}

#[derive(Clone, Copy)]
struct MasterPin {
    mode: PinMode,
    latch: PinState,
}

impl MasterPin {
    fn pulls_low(&self, name: &str) -> bool {
        match (self.mode, self.latch) {
            (PinMode::Input, _) => false,
            (PinMode::Output, PinState::Low) => true,
            (PinMode::Output, PinState::High) => {
                panic!("{name} driven high by the master, open-drain violated")
            }
        }
    }
}

pub(crate) struct SimBus {
    now_us: u64,
    sda: MasterPin,
    scl: MasterPin,
    pullups: bool,
    sda_stuck: bool,
    scl_stuck: bool,
    armed_stretch: Option<Option<u64>>,
    hold_until_us: Option<u64>,
    stretch_began_us: Option<u64>,
    level_sda: bool,
    level_scl: bool,
    conditions: Vec<Condition>,
    yields: u32,
    slave: Option<SimSlave>,
}

impl SimBus {
    /// Idle bus with pull-ups and nothing attached
    pub fn new() -> Self {
        Self {
            now_us: 0,
            sda: MasterPin {
                mode: PinMode::Input,
                latch: PinState::Low,
            },
            scl: MasterPin {
                mode: PinMode::Input,
                latch: PinState::Low,
            },
            pullups: true,
            sda_stuck: false,
            scl_stuck: false,
            armed_stretch: None,
            hold_until_us: None,
            stretch_began_us: None,
            level_sda: true,
            level_scl: true,
            conditions: Vec::new(),
            yields: 0,
            slave: None,
        }
    }

    pub fn with_slave(address: u8) -> Self {
        let mut bus = Self::new();
        bus.slave = Some(SimSlave::new(address));
        bus
    }

    pub fn without_pullups() -> Self {
        let mut bus = Self::new();
        bus.pullups = false;
        bus.settle();
        bus
    }

    /// Short a line to ground
    pub fn stick_low(&mut self, sda: bool, scl: bool) {
        self.sda_stuck = sda;
        self.scl_stuck = scl;
        self.settle();
    }

    /// Hold SCL low the next time the master releases it, for `us`
    /// microseconds or forever
    pub fn stretch_next_clock(&mut self, us: Option<u64>) {
        self.armed_stretch = Some(us);
    }

    pub fn stretch_began_us(&self) -> Option<u64> {
        self.stretch_began_us
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    /// Number of `delay_ms` calls
    pub fn yields(&self) -> u32 {
        self.yields
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
    }

    pub fn sda_high(&self) -> bool {
        self.level_sda
    }

    pub fn scl_high(&self) -> bool {
        self.level_scl
    }

    /// Leave the slave mid-read, driving the first bit of `byte`, as if the
    /// master had been reset during a transfer
    pub fn stall_slave_mid_read(&mut self, byte: u8) {
        self.slave_mut().transmit(byte);
        self.level_sda = self.levels().0;
    }

    pub fn slave(&self) -> &SimSlave {
        self.slave.as_ref().expect("no slave attached")
    }

    pub fn slave_mut(&mut self) -> &mut SimSlave {
        self.slave.as_mut().expect("no slave attached")
    }

    fn levels(&self) -> (bool, bool) {
        let slave_sda = self.slave.as_ref().map_or(false, |slave| slave.sda_low);
        let holding = self
            .hold_until_us
            .map_or(false, |until| self.now_us < until);

        let sda = self.pullups && !self.sda_stuck && !slave_sda && !self.sda.pulls_low("SDA");
        let scl = self.pullups && !self.scl_stuck && !holding && !self.scl.pulls_low("SCL");

        (sda, scl)
    }

    /// Propagate level changes to the slave until the bus is stable
    fn settle(&mut self) {
        loop {
            let (sda, scl) = self.levels();

            if scl != self.level_scl {
                self.level_scl = scl;
                if let Some(slave) = self.slave.as_mut() {
                    if scl {
                        slave.clock_rising(self.level_sda);
                    } else {
                        slave.clock_falling();
                    }
                }
                continue;
            }

            if sda != self.level_sda {
                self.level_sda = sda;
                if scl {
                    let condition = if sda {
                        Condition::Stop
                    } else {
                        Condition::Start
                    };
                    self.conditions.push(condition);
                    if let Some(slave) = self.slave.as_mut() {
                        slave.condition(condition);
                    }
                }
                continue;
            }

            break;
        }
    }

    fn advance(&mut self, us: u64) {
        self.now_us += us;
        self.settle();
    }

    fn pin(&mut self, pin: u8) -> &mut MasterPin {
        match pin {
            SDA => &mut self.sda,
            SCL => &mut self.scl,
            _ => panic!("unknown pin {pin}"),
        }
    }
}

impl Platform for SimBus {
    type Pin = u8;

    fn set_pin_mode(&mut self, pin: u8, mode: PinMode) {
        if pin == SCL && mode == PinMode::Input && self.scl.mode == PinMode::Output {
            if let Some(stretch) = self.armed_stretch.take() {
                self.stretch_began_us = Some(self.now_us);
                self.hold_until_us = Some(stretch.map_or(u64::MAX, |us| self.now_us + us));
            }
        }
        self.pin(pin).mode = mode;
        self.settle();
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        self.pin(pin).latch = level;
        self.settle();
    }

    fn read_pin(&mut self, pin: u8) -> PinState {
        self.advance(1);
        let (sda, scl) = (self.level_sda, self.level_scl);
        match pin {
            SDA => sda.into(),
            SCL => scl.into(),
            _ => panic!("unknown pin {pin}"),
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.yields += 1;
        self.advance(u64::from(ms) * 1000);
    }

    fn now(&mut self) -> Instant {
        self.advance(1);
        Instant::from_ticks(self.now_us / 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum After {
    Receive,
    Transmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveState {
    Idle,
    Receive { value: u8, bits: u8, address: bool },
    AckSlot(After),
    Transmit { byte: u8, bit: u8 },
    MasterAck { acked: bool },
    Ignore,
}

/// Slave device: ACKs its address, records written bytes and transmits
/// queued bytes (0xFF once the queue runs dry)
pub(crate) struct SimSlave {
    address: u8,
    state: SlaveState,
    sda_low: bool,
    echo: bool,
    nack_data: bool,
    tx: VecDeque<u8>,
    received: Vec<u8>,
    master_acks: Vec<bool>,
}

impl SimSlave {
    fn new(address: u8) -> Self {
        Self {
            address,
            state: SlaveState::Idle,
            sda_low: false,
            echo: false,
            nack_data: false,
            tx: VecDeque::new(),
            received: Vec::new(),
            master_acks: Vec::new(),
        }
    }

    /// Queue every received data byte for transmission
    pub fn echo(&mut self) {
        self.echo = true;
    }

    /// NAK every data byte
    pub fn nack_data(&mut self) {
        self.nack_data = true;
    }

    pub fn queue(&mut self, bytes: &[u8]) {
        self.tx.extend(bytes);
    }

    /// Data bytes written by the master
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Acknowledge bit the master sent after each byte read, true for ACK
    pub fn master_acks(&self) -> &[bool] {
        &self.master_acks
    }

    fn next_byte(&mut self) -> u8 {
        self.tx.pop_front().unwrap_or(0xFF)
    }

    fn transmit(&mut self, byte: u8) {
        self.state = SlaveState::Transmit { byte, bit: 0 };
        self.sda_low = byte & 0x80 == 0;
    }

    fn condition(&mut self, condition: Condition) {
        self.sda_low = false;
        self.state = match condition {
            Condition::Start => SlaveState::Receive {
                value: 0,
                bits: 0,
                address: true,
            },
            Condition::Stop => SlaveState::Idle,
        };
    }

    fn clock_rising(&mut self, sda: bool) {
        match &mut self.state {
            SlaveState::Receive { value, bits, .. } if *bits < 8 => {
                *value = (*value << 1) | u8::from(sda);
                *bits += 1;
            }
            SlaveState::MasterAck { acked } => *acked = !sda,
            _ => (),
        }
    }

    fn clock_falling(&mut self) {
        match self.state {
            SlaveState::Receive {
                value,
                bits: 8,
                address: true,
            } => {
                if value >> 1 == self.address {
                    let after = if value & 1 == 1 {
                        After::Transmit
                    } else {
                        After::Receive
                    };
                    self.state = SlaveState::AckSlot(after);
                    self.sda_low = true;
                } else {
                    self.state = SlaveState::Ignore;
                }
            }
            SlaveState::Receive {
                value,
                bits: 8,
                address: false,
            } => {
                self.received.push(value);
                if self.echo {
                    self.tx.push_back(value);
                }
                if self.nack_data {
                    self.state = SlaveState::Ignore;
                } else {
                    self.state = SlaveState::AckSlot(After::Receive);
                    self.sda_low = true;
                }
            }
            SlaveState::AckSlot(After::Receive) => {
                self.sda_low = false;
                self.state = SlaveState::Receive {
                    value: 0,
                    bits: 0,
                    address: false,
                };
            }
            SlaveState::AckSlot(After::Transmit) => {
                let byte = self.next_byte();
                self.transmit(byte);
            }
            SlaveState::Transmit { byte, bit } => {
                let bit = bit + 1;
                if bit < 8 {
                    self.state = SlaveState::Transmit { byte, bit };
                    self.sda_low = (byte << bit) & 0x80 == 0;
                } else {
                    self.state = SlaveState::MasterAck { acked: false };
                    self.sda_low = false;
                }
            }
            SlaveState::MasterAck { acked } => {
                self.master_acks.push(acked);
                if acked {
                    let byte = self.next_byte();
                    self.transmit(byte);
                } else {
                    self.state = SlaveState::Ignore;
                    self.sda_low = false;
                }
            }
            SlaveState::Receive { .. } | SlaveState::Idle | SlaveState::Ignore => (),
        }
    }
}
