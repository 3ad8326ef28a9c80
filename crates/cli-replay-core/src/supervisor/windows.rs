//! Windows process supervision
//!
//! The child is spawned suspended via `CreateProcessW` directly — `std`'s
//! `Command` does not expose the thread handle `ResumeThread` needs —
//! assigned to a Job Object configured with `KILL_ON_JOB_CLOSE`, then
//! resumed. Closing the job (dropping its handle) kills the child and
//! every process it spawned in one step, the Windows analogue of
//! forwarding a signal to a Unix process group. If job creation fails we
//! fall back to `TerminateProcess` on the direct child only and log a
//! warning, matching the Unix group-creation fallback.

use super::ChildOutcome;
use crate::error::Result;
use std::collections::HashMap;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::Foundation::{CloseHandle, FALSE, HANDLE};
use windows_sys::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, SetInformationJobObject,
    JobObjectExtendedLimitInformation, JOBOBJECT_BASIC_LIMIT_INFORMATION,
    JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
};
use windows_sys::Win32::System::Threading::{
    CreateProcessW, GetExitCodeProcess, ResumeThread, TerminateProcess, WaitForSingleObject,
    CREATE_SUSPENDED, CREATE_UNICODE_ENVIRONMENT, INFINITE, PROCESS_INFORMATION, STARTUPINFOW,
};

/// RAII wrapper so the job handle is always closed — and `KILL_ON_JOB_CLOSE`
/// fires — exactly once, regardless of which exit path we take.
struct JobHandle(HANDLE);

impl Drop for JobHandle {
    fn drop(&mut self) {
        if self.0 != 0 {
            unsafe {
                CloseHandle(self.0);
            }
        }
    }
}

struct ProcessHandles {
    process: HANDLE,
    thread: HANDLE,
}

impl Drop for ProcessHandles {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.thread);
            CloseHandle(self.process);
        }
    }
}

fn wide_nul(s: &str) -> Vec<u16> {
    std::ffi::OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.contains([' ', '\t', '"']) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

fn build_command_line(command: &str, args: &[String]) -> String {
    let mut parts = vec![quote_arg(command)];
    parts.extend(args.iter().map(|a| quote_arg(a)));
    parts.join(" ")
}

fn build_environment_block(env: &HashMap<String, String>) -> Vec<u16> {
    let mut block = Vec::new();
    for (k, v) in env {
        block.extend(format!("{}={}", k, v).encode_utf16());
        block.push(0);
    }
    for (k, v) in std::env::vars() {
        if env.contains_key(&k) {
            continue;
        }
        block.extend(format!("{}={}", k, v).encode_utf16());
        block.push(0);
    }
    block.push(0);
    block
}

pub fn spawn_and_supervise(
    command: &str,
    args: &[String],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Result<ChildOutcome> {
    let mut cmdline = wide_nul(&build_command_line(command, args));
    let mut env_block = build_environment_block(env);
    let cwd_wide = cwd.map(|p| wide_nul(&p.display().to_string()));

    let mut startup_info: STARTUPINFOW = unsafe { std::mem::zeroed() };
    startup_info.cb = std::mem::size_of::<STARTUPINFOW>() as u32;
    let mut process_info: PROCESS_INFORMATION = unsafe { std::mem::zeroed() };

    let ok = unsafe {
        CreateProcessW(
            std::ptr::null(),
            cmdline.as_mut_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            FALSE,
            CREATE_SUSPENDED | CREATE_UNICODE_ENVIRONMENT,
            env_block.as_mut_ptr() as *mut core::ffi::c_void,
            cwd_wide
                .as_ref()
                .map(|w| w.as_ptr())
                .unwrap_or(std::ptr::null()),
            &startup_info,
            &mut process_info,
        )
    };

    if ok == 0 {
        let err = std::io::Error::last_os_error();
        return Err(super::classify_spawn_error(command, err));
    }

    let handles = ProcessHandles {
        process: process_info.hProcess,
        thread: process_info.hThread,
    };

    let job = create_job_with_kill_on_close();
    let have_job = job.is_some();
    if let Some(ref job) = job {
        unsafe {
            if AssignProcessToJobObject(job.0, handles.process) == 0 {
                tracing::warn!(
                    "failed to assign child to job object; falling back to direct-child-only cleanup"
                );
            }
        }
    } else {
        tracing::warn!("job object creation failed; falling back to direct-child-only cleanup");
    }

    unsafe {
        ResumeThread(handles.thread);
    }

    unsafe {
        WaitForSingleObject(handles.process, INFINITE);
    }

    let mut exit_code: u32 = 0;
    unsafe {
        GetExitCodeProcess(handles.process, &mut exit_code);
    }

    // Guaranteed cleanup: dropping the job (if we have one) kills every
    // surviving process in the tree via KILL_ON_JOB_CLOSE. This runs
    // unconditionally on every exit path.
    drop(job);
    if !have_job {
        unsafe {
            TerminateProcess(handles.process, 1);
        }
    }

    Ok(ChildOutcome::Exited(exit_code as i32))
}

fn create_job_with_kill_on_close() -> Option<JobHandle> {
    unsafe {
        let job = CreateJobObjectW(std::ptr::null(), std::ptr::null());
        if job == 0 {
            return None;
        }
        let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
        info.BasicLimitInformation = JOBOBJECT_BASIC_LIMIT_INFORMATION {
            LimitFlags: JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
            ..std::mem::zeroed()
        };
        let ok = SetInformationJobObject(
            job,
            JobObjectExtendedLimitInformation,
            &info as *const _ as *const core::ffi::c_void,
            std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        );
        if ok == 0 {
            CloseHandle(job);
            return None;
        }
        Some(JobHandle(job))
    }
}
