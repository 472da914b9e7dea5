#![forbid(unsafe_code)]

//! Preset and user-defined EVM networks.
//!
//! The manager starts from the preset list, then overlays whatever custom
//! networks the [`NetworkStorage`] backend holds. Only networks that are not
//! presets, or presets the user modified, are written back.
//!
//! # Invariants
//!
//! 1. Chain ids are unique; an overlaid entry keeps the preset's position.
//! 2. The active network can never be removed.
//! 3. An update never changes a network's chain id.
//! 4. Persistence failures are logged and never surface as errors.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};
use wkit_wallet::{
    AssumeReachable, NetworkConfig, NetworkConfigError, NetworkUpdate, RpcProbe, RpcProbeResult,
    preset_networks,
};

use crate::error::{NetworkManagerError, StorageError};
use crate::reactive::Subscription;

/// Persistence for custom networks, stored as a JSON array.
pub trait NetworkStorage {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&mut self, json: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetworkStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryNetworkStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(json.into()))),
        }
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl NetworkStorage for MemoryNetworkStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, json: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

/// Change notification delivered to [`NetworkManager::subscribe`] callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Added(NetworkConfig),
    Updated {
        network: NetworkConfig,
        old: NetworkConfig,
    },
    Removed(NetworkConfig),
    Switched {
        network: NetworkConfig,
        old_chain_id: Option<i64>,
    },
    Reset,
}

impl NetworkEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "network-added",
            Self::Updated { .. } => "network-updated",
            Self::Removed(_) => "network-removed",
            Self::Switched { .. } => "network-switched",
            Self::Reset => "networks-reset",
        }
    }
}

type Listener = Rc<dyn Fn(&NetworkEvent)>;

pub struct NetworkManager {
    presets: Vec<NetworkConfig>,
    networks: Vec<NetworkConfig>,
    current: Option<i64>,
    storage: Box<dyn NetworkStorage>,
    probe: Box<dyn RpcProbe>,
    listeners: RefCell<Vec<Weak<dyn Fn(&NetworkEvent)>>>,
}

impl fmt::Debug for NetworkManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkManager")
            .field("networks", &self.networks.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl Default for NetworkManager {
    fn default() -> Self {
        Self::new(Box::new(MemoryNetworkStorage::new()), Box::new(AssumeReachable))
    }
}

impl NetworkManager {
    /// Manager over the built-in presets.
    pub fn new(storage: Box<dyn NetworkStorage>, probe: Box<dyn RpcProbe>) -> Self {
        Self::with_presets(preset_networks(), storage, probe)
    }

    pub fn with_presets(
        presets: Vec<NetworkConfig>,
        storage: Box<dyn NetworkStorage>,
        probe: Box<dyn RpcProbe>,
    ) -> Self {
        let mut manager = Self {
            networks: presets.clone(),
            presets,
            current: None,
            storage,
            probe,
            listeners: RefCell::new(Vec::new()),
        };
        manager.load();
        manager
    }

    fn load(&mut self) {
        let stored = match self.storage.load() {
            Ok(Some(json)) => json,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "failed to load custom networks");
                return;
            }
        };
        match serde_json::from_str::<Vec<NetworkConfig>>(&stored) {
            Ok(custom) => {
                debug!(count = custom.len(), "custom networks loaded");
                for network in custom {
                    self.upsert(network);
                }
            }
            Err(err) => warn!(error = %StorageError::from(err), "failed to load custom networks"),
        }
    }

    fn persist(&mut self) {
        let custom: Vec<&NetworkConfig> = self
            .networks
            .iter()
            .filter(|n| self.differs_from_preset(n))
            .collect();
        let result = serde_json::to_string(&custom)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.save(&json));
        if let Err(err) = result {
            warn!(error = %err, "failed to save custom networks");
        }
    }

    fn differs_from_preset(&self, network: &NetworkConfig) -> bool {
        self.preset(network.chain_id) != Some(network)
    }

    fn preset(&self, chain_id: i64) -> Option<&NetworkConfig> {
        self.presets.iter().find(|p| p.chain_id == chain_id)
    }

    fn position(&self, chain_id: i64) -> Option<usize> {
        self.networks.iter().position(|n| n.chain_id == chain_id)
    }

    fn upsert(&mut self, network: NetworkConfig) {
        match self.position(network.chain_id) {
            Some(i) => self.networks[i] = network,
            None => self.networks.push(network),
        }
    }

    fn probe_rpc(&self, url: &str, chain_id: i64) -> Result<(), String> {
        match self.probe.probe(url, chain_id) {
            RpcProbeResult::Reachable => Ok(()),
            RpcProbeResult::Unreachable(reason) => Err(reason),
        }
    }

    /// Structural validation followed by an RPC probe of every endpoint.
    fn validate_full(&self, config: &NetworkConfig) -> Result<(), NetworkConfigError> {
        config.validate()?;
        let mut problems = Vec::new();
        if let Err(reason) = self.probe_rpc(&config.default_rpc_url, config.chain_id) {
            problems.push(format!("Default RPC URL validation failed: {reason}"));
        }
        for url in config.rpc_urls.iter().filter(|u| **u != config.default_rpc_url) {
            if let Err(reason) = self.probe_rpc(url, config.chain_id) {
                problems.push(format!("RPC URL {url} validation failed: {reason}"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(NetworkConfigError { problems })
        }
    }

    pub fn add_network(&mut self, network: NetworkConfig) -> Result<(), NetworkManagerError> {
        if self.position(network.chain_id).is_some() {
            return Err(NetworkManagerError::AlreadyExists(network.chain_id));
        }
        self.validate_full(&network)?;
        self.networks.push(network.clone());
        self.persist();
        info!(chain_id = network.chain_id, name = %network.name, "network added");
        self.emit(&NetworkEvent::Added(network));
        Ok(())
    }

    /// Apply `update` to an existing network.
    ///
    /// With `skip_full_validation` only the default RPC is probed.
    pub fn update_network(
        &mut self,
        chain_id: i64,
        update: NetworkUpdate,
        skip_full_validation: bool,
    ) -> Result<(), NetworkManagerError> {
        let index = self
            .position(chain_id)
            .ok_or(NetworkManagerError::NotFound(chain_id))?;
        if update.chain_id.is_some_and(|id| id != chain_id) {
            return Err(NetworkManagerError::ChainIdImmutable);
        }
        let old = self.networks[index].clone();
        let next = old.merged(update);

        if skip_full_validation {
            if !next.default_rpc_url.is_empty() {
                self.probe_rpc(&next.default_rpc_url, chain_id)
                    .map_err(|reason| NetworkManagerError::RpcUnavailable {
                        url: next.default_rpc_url.clone(),
                        reason,
                    })?;
            }
        } else {
            self.validate_full(&next)?;
        }

        self.networks[index] = next.clone();
        self.persist();
        info!(chain_id, "network updated");
        self.emit(&NetworkEvent::Updated { network: next, old });
        Ok(())
    }

    pub fn remove_network(&mut self, chain_id: i64) -> Result<NetworkConfig, NetworkManagerError> {
        let index = self
            .position(chain_id)
            .ok_or(NetworkManagerError::NotFound(chain_id))?;
        if self.current == Some(chain_id) {
            return Err(NetworkManagerError::ActiveNetwork(chain_id));
        }
        let removed = self.networks.remove(index);
        self.persist();
        info!(chain_id, "network removed");
        self.emit(&NetworkEvent::Removed(removed.clone()));
        Ok(removed)
    }

    /// Make `chain_id` the active network, probing its default RPC unless
    /// `skip_validation` is set.
    pub fn switch_network(
        &mut self,
        chain_id: i64,
        skip_validation: bool,
    ) -> Result<(), NetworkManagerError> {
        let network = self
            .network(chain_id)
            .cloned()
            .ok_or(NetworkManagerError::NotFound(chain_id))?;
        if !skip_validation {
            self.probe_rpc(&network.default_rpc_url, chain_id)
                .map_err(|reason| NetworkManagerError::RpcUnavailable {
                    url: network.default_rpc_url.clone(),
                    reason,
                })?;
        }
        let old_chain_id = self.current.replace(chain_id);
        info!(chain_id, old_chain_id = ?old_chain_id, "network switched");
        self.emit(&NetworkEvent::Switched {
            network,
            old_chain_id,
        });
        Ok(())
    }

    /// Drop every custom network and modification.
    ///
    /// The active chain id is kept even if it no longer resolves.
    pub fn reset_to_presets(&mut self) {
        self.networks = self.presets.clone();
        if let Err(err) = self.storage.clear() {
            warn!(error = %err, "failed to clear custom networks");
        }
        info!("networks reset to presets");
        self.emit(&NetworkEvent::Reset);
    }

    #[must_use]
    pub fn all_networks(&self) -> &[NetworkConfig] {
        &self.networks
    }

    /// Networks limited to `chain_ids` (when given); pure custom networks
    /// are dropped unless `include_custom`.
    #[must_use]
    pub fn filtered_networks(
        &self,
        chain_ids: Option<&[i64]>,
        include_custom: bool,
    ) -> Vec<NetworkConfig> {
        self.networks
            .iter()
            .filter(|n| chain_ids.is_none_or(|ids| ids.contains(&n.chain_id)))
            .filter(|n| include_custom || self.is_preset_network(n.chain_id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn network(&self, chain_id: i64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    #[must_use]
    pub fn current_chain_id(&self) -> Option<i64> {
        self.current
    }

    #[must_use]
    pub fn current_network(&self) -> Option<&NetworkConfig> {
        self.current.and_then(|id| self.network(id))
    }

    #[must_use]
    pub fn is_preset_network(&self, chain_id: i64) -> bool {
        self.preset(chain_id).is_some()
    }

    /// Known and either not a preset or modified from one.
    #[must_use]
    pub fn is_custom_network(&self, chain_id: i64) -> bool {
        self.network(chain_id)
            .is_some_and(|n| self.differs_from_preset(n))
    }

    /// Register `f` for network events. Dropping the guard unsubscribes.
    pub fn subscribe(&self, f: impl Fn(&NetworkEvent) + 'static) -> Subscription {
        let strong: Listener = Rc::new(f);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription::from_guard(Box::new(strong))
    }

    fn emit(&self, event: &NetworkEvent) {
        let live: Vec<Listener> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        debug!(kind = event.kind(), listeners = live.len(), "network event");
        for listener in &live {
            listener(event);
        }
    }
}
