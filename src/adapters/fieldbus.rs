//! Field-bus transport placeholder.
//!
//! The serial Modbus RTU transport lives outside this crate.  Until a board
//! wires one in, [`NullFieldBus`] satisfies [`FieldBusPort`] and serves no
//! requests.  [`ScriptedFieldBus`] replays a fixed request list, which is
//! how the bench firmware and the tests exercise the register map through
//! the same port the real transport uses.

use heapless::Vec;
use log::debug;

use crate::app::ports::FieldBusPort;
use crate::error::RegisterError;
use crate::registers::DataModel;

/// Transport that never receives anything.
#[derive(Debug, Default)]
pub struct NullFieldBus;

impl FieldBusPort for NullFieldBus {
    fn poll<M: DataModel>(&mut self, _model: &mut M) -> usize {
        0
    }
}

/// One decoded request as a transport would hand it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    ReadCoil(u16),
    ReadDiscreteInput(u16),
    ReadInputRegister(u16),
    ReadHoldingRegister(u16),
    WriteCoil(u16, bool),
    WriteHoldingRegister(u16, u16),
}

/// Response to a [`Request`]: the value read (writes echo the value) or
/// the exception the transport would send back.
pub type Response = Result<u16, RegisterError>;

pub const SCRIPT_DEPTH: usize = 32;

/// Transport that serves a queued list of requests, one per poll.
#[derive(Debug, Default)]
pub struct ScriptedFieldBus {
    pending: Vec<Request, SCRIPT_DEPTH>,
    next: usize,
    responses: Vec<Response, SCRIPT_DEPTH>,
}

impl ScriptedFieldBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request.  Returns it back if the script is full.
    pub fn push(&mut self, req: Request) -> Result<(), Request> {
        self.pending.push(req)
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn is_drained(&self) -> bool {
        self.next >= self.pending.len()
    }
}

pub fn serve<M: DataModel>(model: &mut M, req: Request) -> Response {
    match req {
        Request::ReadCoil(a) => model.read_coil(a).map(u16::from),
        Request::ReadDiscreteInput(a) => model.read_discrete_input(a).map(u16::from),
        Request::ReadInputRegister(a) => model.read_input_register(a),
        Request::ReadHoldingRegister(a) => model.read_holding_register(a),
        Request::WriteCoil(a, v) => model.write_coil(a, v).map(|()| u16::from(v)),
        Request::WriteHoldingRegister(a, v) => model.write_holding_register(a, v).map(|()| v),
    }
}

impl FieldBusPort for ScriptedFieldBus {
    fn poll<M: DataModel>(&mut self, model: &mut M) -> usize {
        let Some(&req) = self.pending.get(self.next) else {
            return 0;
        };
        self.next += 1;
        let resp = serve(model, req);
        debug!("BUS | {:?} -> {:?}", req, resp);
        // Same capacity as `pending`, cannot overflow.
        let _ = self.responses.push(resp);
        1
    }
}
