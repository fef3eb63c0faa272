//! DACL and token queries through the Win32 security API.

use super::windows::{AccessRule, AclSource, Principal, RuleKind};
use std::ffi::c_void;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use windows_sys::Win32::Foundation::{CloseHandle, LocalFree, ERROR_SUCCESS, HANDLE};
use windows_sys::Win32::Security::Authorization::{
    ConvertSidToStringSidW, GetNamedSecurityInfoW, SE_FILE_OBJECT,
};
use windows_sys::Win32::Security::{
    AclSizeInformation, GetAce, GetAclInformation, GetTokenInformation, TokenGroups, TokenUser,
    ACCESS_ALLOWED_ACE, ACE_HEADER, ACL, ACL_SIZE_INFORMATION, DACL_SECURITY_INFORMATION,
    PSECURITY_DESCRIPTOR, PSID, TOKEN_GROUPS, TOKEN_QUERY, TOKEN_USER,
};
use windows_sys::Win32::System::SystemServices::{ACCESS_ALLOWED_ACE_TYPE, ACCESS_DENIED_ACE_TYPE};
use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

const INHERIT_ONLY_ACE: u8 = 0x08;
const EVERYONE: &str = "S-1-1-0";

/// Reads ACLs with `GetNamedSecurityInfoW` and the principal from the process token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAclSource;

impl NativeAclSource {
    /// Create a new source.
    pub fn new() -> Self {
        Self
    }
}

/// Closes a token handle on drop.
struct TokenHandle(HANDLE);

impl Drop for TokenHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from OpenProcessToken and is closed once.
        unsafe { CloseHandle(self.0) };
    }
}

/// Frees a `LocalAlloc`ed block on drop.
struct LocalBlock(*mut c_void);

impl Drop for LocalBlock {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the pointer was allocated by the system with LocalAlloc.
            unsafe { LocalFree(self.0) };
        }
    }
}

fn wide(path: &Path) -> Vec<u16> {
    path.as_os_str().encode_wide().chain(Some(0)).collect()
}

/// Render a SID as `S-1-...`.
///
/// # Safety
///
/// `sid` must point to a valid SID.
unsafe fn sid_to_string(sid: PSID) -> io::Result<String> {
    let mut buffer: *mut u16 = ptr::null_mut();
    if ConvertSidToStringSidW(sid, &mut buffer) == 0 {
        return Err(io::Error::last_os_error());
    }
    let _guard = LocalBlock(buffer.cast());

    let mut len = 0;
    while *buffer.add(len) != 0 {
        len += 1;
    }
    Ok(String::from_utf16_lossy(std::slice::from_raw_parts(buffer, len)))
}

/// Fetch one token information class into an owned, suitably aligned buffer.
fn token_information(token: &TokenHandle, class: i32) -> io::Result<Vec<u64>> {
    let mut needed = 0u32;
    // SAFETY: a null buffer with zero length only queries the required size.
    unsafe { GetTokenInformation(token.0, class, ptr::null_mut(), 0, &mut needed) };
    if needed == 0 {
        return Err(io::Error::last_os_error());
    }

    let mut buffer = vec![0u64; (needed as usize).div_ceil(8)];
    // SAFETY: the buffer is at least `needed` bytes long.
    let ok = unsafe {
        GetTokenInformation(
            token.0,
            class,
            buffer.as_mut_ptr().cast(),
            needed,
            &mut needed,
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(buffer)
}

impl AclSource for NativeAclSource {
    fn current_principal(&self) -> io::Result<Principal> {
        let mut raw: HANDLE = ptr::null_mut();
        // SAFETY: GetCurrentProcess returns a pseudo-handle valid for this call.
        if unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut raw) } == 0 {
            return Err(io::Error::last_os_error());
        }
        let token = TokenHandle(raw);

        let user = token_information(&token, TokenUser)?;
        // SAFETY: the buffer holds a TOKEN_USER written by the system.
        let identity = unsafe {
            let user = &*(user.as_ptr().cast::<TOKEN_USER>());
            sid_to_string(user.User.Sid)?
        };

        let groups_buffer = token_information(&token, TokenGroups)?;
        let mut groups = Vec::new();
        // SAFETY: the buffer holds a TOKEN_GROUPS with `GroupCount` trailing entries.
        unsafe {
            let token_groups = &*(groups_buffer.as_ptr().cast::<TOKEN_GROUPS>());
            let entries = std::slice::from_raw_parts(
                token_groups.Groups.as_ptr(),
                token_groups.GroupCount as usize,
            );
            for entry in entries {
                groups.push(sid_to_string(entry.Sid)?);
            }
        }

        Ok(Principal { identity, groups })
    }

    fn rules_for(&self, path: &Path) -> io::Result<Vec<AccessRule>> {
        let name = wide(path);
        let mut dacl: *mut ACL = ptr::null_mut();
        let mut descriptor: PSECURITY_DESCRIPTOR = ptr::null_mut();

        // SAFETY: all out-pointers are valid; the descriptor is freed by the guard.
        let status = unsafe {
            GetNamedSecurityInfoW(
                name.as_ptr(),
                SE_FILE_OBJECT,
                DACL_SECURITY_INFORMATION,
                ptr::null_mut(),
                ptr::null_mut(),
                &mut dacl,
                ptr::null_mut(),
                &mut descriptor,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(status as i32));
        }
        let _guard = LocalBlock(descriptor);

        // A null DACL grants everyone everything.
        if dacl.is_null() {
            return Ok(vec![AccessRule::allow(EVERYONE, u32::MAX)]);
        }

        let mut info = ACL_SIZE_INFORMATION {
            AceCount: 0,
            AclBytesInUse: 0,
            AclBytesFree: 0,
        };
        // SAFETY: `dacl` points into the descriptor kept alive by `_guard`.
        let ok = unsafe {
            GetAclInformation(
                dacl,
                (&mut info as *mut ACL_SIZE_INFORMATION).cast(),
                std::mem::size_of::<ACL_SIZE_INFORMATION>() as u32,
                AclSizeInformation,
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }

        let mut rules = Vec::with_capacity(info.AceCount as usize);
        for index in 0..info.AceCount {
            let mut ace: *mut c_void = ptr::null_mut();
            // SAFETY: index is below AceCount; the ACE lives inside the DACL.
            if unsafe { GetAce(dacl, index, &mut ace) } == 0 {
                return Err(io::Error::last_os_error());
            }

            // SAFETY: every ACE starts with an ACE_HEADER.
            let header = unsafe { &*(ace.cast::<ACE_HEADER>()) };
            if header.AceFlags & INHERIT_ONLY_ACE != 0 {
                continue;
            }
            let kind = match u32::from(header.AceType) {
                ACCESS_ALLOWED_ACE_TYPE => RuleKind::Allow,
                ACCESS_DENIED_ACE_TYPE => RuleKind::Deny,
                // Object and callback ACEs do not apply to plain files.
                _ => continue,
            };

            // SAFETY: allowed and denied ACEs share the ACCESS_ALLOWED_ACE layout.
            let (rights, identity) = unsafe {
                let body = &*(ace.cast::<ACCESS_ALLOWED_ACE>());
                let sid = ptr::addr_of!(body.SidStart) as PSID;
                (body.Mask, sid_to_string(sid)?)
            };
            rules.push(AccessRule {
                identity,
                kind,
                rights,
            });
        }

        Ok(rules)
    }
}
