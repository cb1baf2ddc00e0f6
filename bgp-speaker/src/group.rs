// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out primitives. Each spawns one named thread per task, handing the
//! task its own value as an argument, and joins every thread before `wait`
//! returns.
//!
//! [`ErrorGroup`] collects task failures and hands them back to the caller.
//! [`WaitGroup`] runs tasks that deal with their own failures; it only
//! counts tasks that could not be spawned or that panicked.

use crate::error::TaskError;
use crate::log::speaker_log;
use crate::MOD_GROUP;
use slog::Logger;
use speaker_common::lock;
use std::any::Any;
use std::sync::{Arc, Mutex};
use std::thread::{Builder, JoinHandle};

pub struct ErrorGroup<E> {
    failures: Arc<Mutex<Vec<E>>>,
    tasks: Vec<(String, JoinHandle<()>)>,
}

//NOTE necessary as #derive is broken for generic types
impl<E> Default for ErrorGroup<E> {
    fn default() -> Self {
        Self {
            failures: Arc::new(Mutex::new(Vec::new())),
            tasks: Vec::new(),
        }
    }
}

impl<E: From<TaskError> + Send + 'static> ErrorGroup<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f(arg)` on a new thread. A task that fails to spawn is recorded
    /// as a failure right away.
    pub fn go<T, F>(&mut self, name: impl Into<String>, arg: T, f: F)
    where
        T: Send + 'static,
        F: FnOnce(T) -> Result<(), E> + Send + 'static,
    {
        let name = name.into();
        let failures = self.failures.clone();
        let spawned = Builder::new().name(thread_name(&name)).spawn(move || {
            if let Err(e) = f(arg) {
                lock!(failures).push(e);
            }
        });
        match spawned {
            Ok(handle) => self.tasks.push((name, handle)),
            Err(error) => lock!(self.failures)
                .push(TaskError::Spawn { task: name, error }.into()),
        }
    }

    /// Join every task. Returns every recorded failure, or `Ok` if there
    /// were none.
    pub fn wait(self) -> Result<(), Vec<E>> {
        let Self { failures, tasks } = self;
        for (task, handle) in tasks {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                lock!(failures)
                    .push(TaskError::Panicked { task, message }.into());
            }
        }
        let failures = std::mem::take(&mut *lock!(failures));
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

pub struct WaitGroup {
    log: Logger,
    tasks: Vec<(String, JoinHandle<()>)>,
    lost: usize,
}

impl WaitGroup {
    pub fn new(log: Logger) -> Self {
        Self {
            log,
            tasks: Vec::new(),
            lost: 0,
        }
    }

    /// Run `f(arg)` on a new thread. A spawn failure is logged and counted.
    pub fn go<T, F>(&mut self, name: impl Into<String>, arg: T, f: F)
    where
        T: Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        let name = name.into();
        match Builder::new()
            .name(thread_name(&name))
            .spawn(move || f(arg))
        {
            Ok(handle) => self.tasks.push((name, handle)),
            Err(e) => {
                speaker_log!(self.log,
                    error,
                    MOD_GROUP,
                    "failed to spawn task";
                    "task" => name,
                    "error" => e.to_string()
                );
                self.lost += 1;
            }
        }
    }

    /// Join every task. Returns how many tasks never spawned or panicked.
    pub fn wait(self) -> usize {
        let Self {
            log,
            tasks,
            mut lost,
        } = self;
        for (task, handle) in tasks {
            if let Err(payload) = handle.join() {
                speaker_log!(log,
                    error,
                    MOD_GROUP,
                    "task panicked";
                    "task" => task,
                    "panic" => panic_message(payload.as_ref())
                );
                lost += 1;
            }
        }
        lost
    }
}

// OS thread names cannot carry interior nul bytes.
fn thread_name(task: &str) -> String {
    task.replace('\0', "")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
