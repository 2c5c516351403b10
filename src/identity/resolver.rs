//! Host MAC and switch id assignment.

use super::allocator::{device_seed, IdAllocator};
use super::mac::Mac;
use crate::config::{HostSpec, SwitchSpec};
use log::warn;

/// Hands out MACs to hosts and device ids to switches for one resolution run.
///
/// The two domains are independent: a host MAC derived from `1` does not
/// stop a switch from getting id `1`.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    macs: IdAllocator,
    device_ids: IdAllocator,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    pub fn new() -> Self {
        IdentityResolver {
            macs: IdAllocator::new("mac", Mac::MAX_VALUE),
            device_ids: IdAllocator::new("device id", u64::from(u32::MAX)),
        }
    }

    /// Assign a MAC to `host` and write it back as a string.
    ///
    /// An explicit MAC is kept when it parses and is not taken yet. Without
    /// one, the digits of the host name seed the value.
    pub fn assign_host_mac(&mut self, host: &mut HostSpec) -> Mac {
        let candidate = match host.mac.as_deref() {
            Some(explicit) => match explicit.parse::<Mac>() {
                Ok(mac) => Some(mac.to_u64()),
                Err(e) => {
                    warn!("host {}: {}, allocating a new one", host.name, e);
                    None
                }
            },
            None => device_seed(&host.name),
        };

        let value = self.macs.claim(&host.name, candidate);
        // claim() stays within the MAC range
        let mac = Mac::from_u64(value).unwrap_or(Mac([0; 6]));
        host.mac = Some(mac.to_string());
        mac
    }

    /// Assign a device id to `switch` and write it back.
    pub fn assign_switch_id(&mut self, switch: &mut SwitchSpec) -> u32 {
        let candidate = switch
            .id
            .map(u64::from)
            .or_else(|| device_seed(&switch.name));

        let value = self.device_ids.claim(&switch.name, candidate);
        let id = u32::try_from(value).unwrap_or(u32::MAX);
        switch.id = Some(id);
        id
    }
}
