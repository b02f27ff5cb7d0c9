//! In-flight job table: native request token -> owning channel and job.

use std::collections::HashMap;

use curl::multi::Easy2Handle;

use crate::channel::ChannelId;

/// One attached request. `handle` is `None` once the request was taken out
/// for detaching; the entry itself stays until the channel was notified.
pub(crate) struct ResourceEntry<H> {
    pub channel: ChannelId,
    pub job_name: String,
    pub handle: Option<Easy2Handle<H>>,
}

/// Tokens are stored on the request handle (`CURLOPT_PRIVATE`) so completion
/// messages can be routed back without scanning.
pub(crate) struct ResourceTable<H> {
    entries: HashMap<usize, ResourceEntry<H>>,
    next_token: usize,
}

impl<H> ResourceTable<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_token: 0,
        }
    }

    /// Tags `handle` with a fresh token and records it. Returns the token.
    pub fn insert(
        &mut self,
        channel: ChannelId,
        job_name: String,
        mut handle: Easy2Handle<H>,
    ) -> Result<usize, curl::Error> {
        let token = self.next_token;
        handle.set_token(token)?;
        self.next_token = self.next_token.wrapping_add(1);
        self.entries.insert(
            token,
            ResourceEntry {
                channel,
                job_name,
                handle: Some(handle),
            },
        );
        Ok(token)
    }

    pub fn get(&self, token: usize) -> Option<&ResourceEntry<H>> {
        self.entries.get(&token)
    }

    /// Takes the request handle of `token` for detaching. The entry keeps
    /// counting as in flight until [`Self::remove`].
    pub fn take_handle(&mut self, token: usize) -> Option<Easy2Handle<H>> {
        self.entries.get_mut(&token).and_then(|e| e.handle.take())
    }

    pub fn remove(&mut self, token: usize) -> Option<ResourceEntry<H>> {
        self.entries.remove(&token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// In-flight jobs owned by `channel`.
    pub fn count_for(&self, channel: ChannelId) -> usize {
        self.entries.values().filter(|e| e.channel == channel).count()
    }
}
