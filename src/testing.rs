//! In-process doubles for the transport and the prompter.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::net::Ipv4Addr;
use std::sync::Mutex;

use crate::discovery::DiscoveredBulb;
use crate::errors::Error;
use crate::preset::ColorMode;
use crate::prompt::{Prompter, Rejection};
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetPower(Ipv4Addr, bool),
    SetLight(Ipv4Addr, u8, ColorMode),
    RunIndicator(Ipv4Addr),
    StopIndicator(Ipv4Addr),
}

/// Records every command; bulbs listed as unreachable fail with a timeout.
#[derive(Default)]
pub struct MockTransport {
    pub discovered: Vec<DiscoveredBulb>,
    pub unreachable: HashSet<Ipv4Addr>,
    pub powered: HashSet<Ipv4Addr>,
    pub commands: Mutex<Vec<Command>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discovered(ips: &[Ipv4Addr]) -> Self {
        MockTransport {
            discovered: ips
                .iter()
                .map(|ip| DiscoveredBulb::new(*ip, &format!("mac-{ip}")))
                .collect(),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    fn reach(&self, ip: Ipv4Addr, command: Command) -> Result<()> {
        if self.unreachable.contains(&ip) {
            return Err(Error::socket(
                "receive",
                io::Error::new(io::ErrorKind::TimedOut, "receive timeout"),
            ));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

impl Transport for MockTransport {
    async fn discover(&self) -> Result<Vec<DiscoveredBulb>> {
        Ok(self.discovered.clone())
    }

    async fn power(&self, ip: Ipv4Addr) -> Result<bool> {
        if self.unreachable.contains(&ip) {
            return Err(Error::socket(
                "receive",
                io::Error::new(io::ErrorKind::TimedOut, "receive timeout"),
            ));
        }
        Ok(self.powered.contains(&ip))
    }

    async fn set_power(&self, ip: Ipv4Addr, on: bool) -> Result<()> {
        self.reach(ip, Command::SetPower(ip, on))
    }

    async fn set_light(&self, ip: Ipv4Addr, brightness: u8, mode: &ColorMode) -> Result<()> {
        self.reach(ip, Command::SetLight(ip, brightness, *mode))
    }

    async fn run_indicator(&self, ip: Ipv4Addr) -> Result<()> {
        self.reach(ip, Command::RunIndicator(ip))
    }

    async fn stop_indicator(&self, ip: Ipv4Addr) -> Result<()> {
        self.reach(ip, Command::StopIndicator(ip))
    }
}

/// Replays canned answers and remembers every rejection it was shown.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub rejections: Vec<Rejection>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            rejections: Vec::new(),
        }
    }

    fn next(&mut self, rejected: Option<&Rejection>) -> io::Result<String> {
        if let Some(reason) = rejected {
            self.rejections.push(reason.clone());
        }
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl Prompter for ScriptedPrompter {
    fn bulb_name(&mut self, _ip: Ipv4Addr, rejected: Option<&Rejection>) -> io::Result<String> {
        self.next(rejected)
    }

    fn preset_choice(
        &mut self,
        _bulb: &str,
        _presets: &[&str],
        rejected: Option<&Rejection>,
    ) -> io::Result<String> {
        self.next(rejected)
    }
}

pub fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, last)
}
