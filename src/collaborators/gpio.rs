/// Identifies a GPIO line the way the board's pin-mux does: a port letter
/// (as its ordinal) and a pin number within that port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin {
    pub port: u8,
    pub pin: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// The GPIO subscription service from §6 (`GPIO_subscribe`/
/// `GPIO_unsubscribe`), used by `StepDirInput` to register and tear down
/// the step-edge handler, and to read the direction pin directly.
pub trait GpioService: Send + Sync {
    fn subscribe(&self, pin: GpioPin, pull: Pull, edge: Edge, callback: Box<dyn Fn() + Send + Sync>);
    fn unsubscribe(&self, pin: GpioPin);
    fn set_input(&self, pin: GpioPin, pull: Pull);
    fn read(&self, pin: GpioPin) -> bool;
}
