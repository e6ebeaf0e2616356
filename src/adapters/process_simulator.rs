//! External simulator process speaking JSON lines.
//!
//! Every request spawns the configured program and exchanges one JSON object
//! per line over its stdin/stdout.
//!
//! Planning:
//!
//! ```text
//! -> {"type":"plan","domain":"d.pddl","problem":"p.pddl"}
//! <- {"type":"plan","actions":["(move a b)"]}   or   {"type":"error","message":"..."}
//! ```
//!
//! Simulation:
//!
//! ```text
//! -> {"type":"run","domain":"d.pddl","problem":"p.pddl"}
//! <- {"type":"observe","state":"..","actions":[..],"goals_satisfied":0,"all_goals":false}
//! -> {"type":"act","action":"(move a b)"}
//!    ... repeated until the executive answers {"type":"act","action":null}
//! <- {"type":"report","total_actions":1,"success":true}
//! ```

use std::{
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Error, Result,
    ports::{EpisodeReport, Executive, Planner, ProblemFiles, Simulator, World},
};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Request<'a> {
    Plan { domain: &'a Path, problem: &'a Path },
    Run { domain: &'a Path, problem: &'a Path },
    Act { action: Option<&'a str> },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message {
    Plan { actions: Vec<String> },
    Error { message: String },
    Observe(Observation),
    Report(EpisodeReport),
}

/// Snapshot of the simulated world sent with every `observe` message
#[derive(Debug, Clone, Deserialize)]
struct Observation {
    state: String,
    actions: Vec<String>,
    goals_satisfied: usize,
    all_goals: bool,
}

impl World for Observation {
    fn legal_actions(&self) -> Result<Vec<String>> {
        Ok(self.actions.clone())
    }

    fn state(&self) -> String {
        self.state.clone()
    }

    fn all_goals_satisfied(&self) -> bool {
        self.all_goals
    }

    fn satisfied_goal_count(&self) -> usize {
        self.goals_satisfied
    }
}

/// Simulator and planner backed by an external program.
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessSimulator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments passed to the program on every spawn.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self) -> Result<Session> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Io {
                operation: format!("spawn simulator {}", self.program.display()),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        match (stdin, stdout) {
            (Some(stdin), Some(stdout)) => Ok(Session {
                child,
                stdin: Some(stdin),
                stdout,
            }),
            _ => Err(Error::Simulator {
                message: "simulator pipes are unavailable".to_string(),
            }),
        }
    }
}

impl Simulator for ProcessSimulator {
    fn run(
        &mut self,
        problem: &ProblemFiles,
        executive: &mut dyn Executive,
    ) -> Result<EpisodeReport> {
        let mut session = self.spawn()?;
        session.send(&Request::Run {
            domain: &problem.domain,
            problem: &problem.problem,
        })?;

        loop {
            match session.receive()? {
                Message::Observe(observation) => {
                    let action = executive.next_action(&observation)?;
                    session.send(&Request::Act {
                        action: action.as_deref(),
                    })?;
                }
                Message::Report(report) => {
                    debug!(
                        executive = executive.name(),
                        total_actions = report.total_actions,
                        success = report.success,
                        "simulator reported"
                    );
                    session.close()?;
                    return Ok(report);
                }
                Message::Error { message } => return Err(Error::Simulator { message }),
                Message::Plan { .. } => {
                    return Err(Error::Protocol {
                        message: "unexpected plan message during a run".to_string(),
                    });
                }
            }
        }
    }
}

impl Planner for ProcessSimulator {
    fn make_plan(&self, problem: &ProblemFiles) -> Result<Vec<String>> {
        let mut session = self.spawn()?;
        session.send(&Request::Plan {
            domain: &problem.domain,
            problem: &problem.problem,
        })?;

        let plan = match session.receive()? {
            Message::Plan { actions } => actions,
            Message::Error { message } => return Err(Error::PlanNotFound { reason: message }),
            other => {
                return Err(Error::Protocol {
                    message: format!("expected a plan, got {other:?}"),
                });
            }
        };
        session.close()?;
        Ok(plan)
    }
}

/// One spawned simulator process
struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    fn send(&mut self, request: &Request<'_>) -> Result<()> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        let stdin = self.stdin.as_mut().ok_or_else(|| Error::Simulator {
            message: "simulator input already closed".to_string(),
        })?;
        stdin
            .write_all(line.as_bytes())
            .and_then(|()| stdin.flush())
            .map_err(|source| Error::Io {
                operation: "write to simulator".to_string(),
                source,
            })
    }

    fn receive(&mut self) -> Result<Message> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .map_err(|source| Error::Io {
                operation: "read from simulator".to_string(),
                source,
            })?;
        if read == 0 {
            return Err(Error::Simulator {
                message: "simulator exited before answering".to_string(),
            });
        }
        serde_json::from_str(line.trim()).map_err(|error| Error::Protocol {
            message: format!("invalid simulator message {:?}: {error}", line.trim()),
        })
    }

    /// Close the input and wait for the process to exit.
    fn close(mut self) -> Result<()> {
        drop(self.stdin.take());
        let status = self.child.wait().map_err(|source| Error::Io {
            operation: "wait for simulator".to_string(),
            source,
        })?;
        if !status.success() {
            warn!(%status, "simulator exited with failure status");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
