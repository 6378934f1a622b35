//! The extension host.
//!
//! Owns the registries and the registration task queue, loads extensions
//! subject to the [`LoaderConfig`], and reports on what could not be
//! registered.

use crate::config::LoaderConfig;
use crate::error::{HostError, HostResult};
use crate::extension::{Extension, ExtensionMetadata};
use crate::node::{NodeRegistrationTask, NodeTypeInfo, SlotInfo};
use crate::parameter::ParameterTypeInfo;
use crate::registries::{RegistrationSubscription, Registries};
use crate::settings::SettingsSheetInfo;
use pipeforge_convert::{DataConverter, DataTypeInfo, DatatypeRegistry};
use pipeforge_registry::{
    ChangeNotifier, EntityDefinition, FailedTask, PendingTask, Registration, RegistrationEvent,
    RegistrationTask, Severity, SubscriptionId, TaskId, TaskQueue, TaskSnapshot, ValidityReport,
};
use pipeforge_types::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Published by the host as extensions finish loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    ExtensionRegistered { id: SourceId },
    ExtensionFailed { id: SourceId, message: String },
}

/// An extension whose `register` returned an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedExtension {
    pub metadata: ExtensionMetadata,
    pub message: String,
}

pub struct ExtensionHost {
    registries: Registries,
    queue: TaskQueue<Registries>,
    config: LoaderConfig,
    registered: Vec<ExtensionMetadata>,
    failed: Vec<FailedExtension>,
    events: ChangeNotifier<HostEvent>,
}

impl Default for ExtensionHost {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl ExtensionHost {
    pub fn new(config: LoaderConfig) -> Self {
        let queue = TaskQueue::new();
        let mut registries = Registries::new();
        registries.wire(&queue.signal());
        Self {
            registries,
            queue,
            config,
            registered: Vec::new(),
            failed: Vec::new(),
            events: ChangeNotifier::new(),
        }
    }

    // ================================================================
    // Extensions
    // ================================================================

    /// Loads one extension.
    ///
    /// Blocked and already loaded extensions are refused without calling
    /// `register`. A failing `register` is recorded, published as
    /// [`HostEvent::ExtensionFailed`] and returned.
    pub fn load_extension(&mut self, extension: &dyn Extension) -> HostResult<()> {
        let metadata = extension.metadata();
        let id = metadata.id.clone();

        if !self.config.is_extension_allowed(&id) {
            warn!(extension_id = %id, "Extension blocked by loader configuration");
            return Err(HostError::ExtensionBlocked(id));
        }
        if self.is_loaded(&id) {
            return Err(HostError::ExtensionAlreadyLoaded(id));
        }

        debug!(extension_id = %id, version = %metadata.version, "Registering extension");
        match extension.register(self) {
            Ok(()) => {
                info!(extension_id = %id, "Extension registered");
                self.registered.push(metadata);
                self.events.notify(&HostEvent::ExtensionRegistered { id });
                Ok(())
            }
            Err(e) => {
                let message = format!("{e:#}");
                warn!(extension_id = %id, "Extension failed to register: {}", message);
                self.failed.push(FailedExtension {
                    metadata,
                    message: message.clone(),
                });
                self.events.notify(&HostEvent::ExtensionFailed {
                    id: id.clone(),
                    message: message.clone(),
                });
                Err(HostError::ExtensionFailed { id, message })
            }
        }
    }

    /// Loads extensions in order. Failures do not stop the remaining
    /// extensions from loading; they are returned together.
    pub fn load_extensions(&mut self, extensions: &[Box<dyn Extension>]) -> Vec<HostError> {
        let mut errors = Vec::new();
        for extension in extensions {
            if let Err(e) = self.load_extension(&**extension) {
                errors.push(e);
            }
        }
        errors
    }

    /// True if the extension was registered or failed.
    #[must_use]
    pub fn is_loaded(&self, id: &SourceId) -> bool {
        self.find_extension(id).is_some() || self.failed.iter().any(|f| f.metadata.id == *id)
    }

    /// Metadata of a successfully registered extension.
    #[must_use]
    pub fn find_extension(&self, id: &SourceId) -> Option<&ExtensionMetadata> {
        self.registered.iter().find(|metadata| metadata.id == *id)
    }

    /// Ids of the successfully registered extensions, in load order.
    pub fn registered_extension_ids(&self) -> impl Iterator<Item = &SourceId> {
        self.registered.iter().map(|metadata| &metadata.id)
    }

    #[must_use]
    pub fn registered_extensions(&self) -> &[ExtensionMetadata] {
        &self.registered
    }

    #[must_use]
    pub fn failed_extensions(&self) -> &[FailedExtension] {
        &self.failed
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Registers a node type now, without waiting for its slot and
    /// parameter types. Missing ones show up in the validity report.
    pub fn register_node_type(&mut self, node: NodeTypeInfo, source: &SourceId) -> HostResult<Registration> {
        let registration = self.registries.nodes.register(node, source)?;
        self.run_registration_tasks();
        Ok(registration)
    }

    /// Registers a node type once its slot and parameter types exist.
    pub fn schedule_node_type(&mut self, node: NodeTypeInfo, source: &SourceId) -> TaskId {
        self.schedule(NodeRegistrationTask::new(node, source.clone()))
    }

    pub fn register_data_type(&mut self, info: DataTypeInfo, source: &SourceId) -> HostResult<Registration> {
        let registration = self.registries.data_types.register(info, source)?;
        self.run_registration_tasks();
        Ok(registration)
    }

    pub fn register_converter(&mut self, converter: Arc<dyn DataConverter>) {
        self.registries.data_types.register_converter(converter);
    }

    pub fn register_parameter_type(
        &mut self,
        info: ParameterTypeInfo,
        source: &SourceId,
    ) -> HostResult<Registration> {
        let registration = self.registries.parameters.register(info, source)?;
        self.run_registration_tasks();
        Ok(registration)
    }

    pub fn register_settings_sheet(
        &mut self,
        info: SettingsSheetInfo,
        source: &SourceId,
    ) -> HostResult<Registration> {
        let registration = self.registries.settings.register(info, source)?;
        self.run_registration_tasks();
        Ok(registration)
    }

    /// Queues a registration task and runs a scheduling pass.
    pub fn schedule<T>(&mut self, task: T) -> TaskId
    where
        T: RegistrationTask<Registries> + 'static,
    {
        let id = self.queue.enqueue(task);
        self.run_registration_tasks();
        id
    }

    /// Runs every registration task whose dependencies are satisfied, until
    /// none is left that can run. Returns how many fired.
    ///
    /// A failing task does not fail the registration that unblocked it. It
    /// is kept in [`failed_tasks`](Self::failed_tasks), reported by
    /// [`report_validity`](Self::report_validity), and the remaining tasks
    /// keep running.
    pub fn run_registration_tasks(&mut self) -> usize {
        let before = self.queue.fired_total();
        // A failed task is dequeued before its error is returned.
        while self.queue.run(&mut self.registries).is_err() {}
        self.queue.fired_total() - before
    }

    #[must_use]
    pub fn scheduled_tasks(&self) -> Vec<TaskSnapshot> {
        self.queue.scheduled_tasks()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        self.queue.pending(&self.registries)
    }

    #[must_use]
    pub fn failed_tasks(&self) -> &[FailedTask] {
        self.queue.failed_tasks()
    }

    // ================================================================
    // Queries
    // ================================================================

    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    #[must_use]
    pub fn data_types(&self) -> &DatatypeRegistry {
        &self.registries.data_types
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    // ================================================================
    // Notifications
    // ================================================================

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Subscribes to entity registrations in every registry.
    pub fn subscribe_registrations<F>(&mut self, listener: F) -> RegistrationSubscription
    where
        F: Fn(&RegistrationEvent) + Send + Sync + 'static,
    {
        self.registries.subscribe_all(listener)
    }

    pub fn unsubscribe_registrations(&mut self, subscription: RegistrationSubscription) {
        self.registries.unsubscribe_all(subscription);
    }

    // ================================================================
    // Validation
    // ================================================================

    /// Ends the load phase: runs the remaining tasks once more and returns
    /// the validity report.
    pub fn finish_loading(&mut self) -> ValidityReport {
        self.run_registration_tasks();

        for pending in self.pending_tasks() {
            warn!(task = %pending.description, "Could not register: {}", pending.missing_description());
        }

        let mut report = ValidityReport::new();
        self.report_validity(&mut report);
        info!(
            extensions = self.registered.len(),
            failed = self.failed.len(),
            failed_tasks = self.queue.failed_tasks().len(),
            entities = self.registries.len(),
            pending = self.queue.len(),
            issues = report.len(),
            "Extension loading finished"
        );
        report
    }

    /// Writes failed and pending tasks, failed extensions and, if enabled, invalid
    /// node types into `report`.
    pub fn report_validity(&self, report: &mut ValidityReport) {
        self.queue.report_validity(&self.registries, report);

        let mut extensions = report.resolve("Extensions");
        for failed in &self.failed {
            extensions.resolve(failed.metadata.id.to_string()).report(
                Severity::Error,
                "Error during loading the extension",
                vec![failed.message.clone()],
            );
        }

        if self.config.validate_node_types {
            self.validate_node_types(report);
        }
    }

    fn validate_node_types(&self, report: &mut ValidityReport) {
        let mut nodes = report.resolve("Nodes");
        for node in self.registries.nodes.all().values() {
            let mut entry = nodes.resolve(node.id().to_string());

            let mut seen = HashSet::new();
            for slot in node.slots() {
                if !seen.insert((slot.direction, slot.name.as_str())) {
                    entry.error(format!("duplicate {} slot '{}'", slot.direction.as_str(), slot.name));
                }
                if !self.registries.data_types.has(&slot.data_type) {
                    entry.error(unknown_data_type(slot));
                }
            }

            for parameter in node.parameters() {
                if !self.registries.parameters.has(&parameter.parameter_type) {
                    entry.error(format!(
                        "parameter '{}' has unknown parameter type '{}'",
                        parameter.key, parameter.parameter_type
                    ));
                }
            }
        }
    }
}

fn unknown_data_type(slot: &SlotInfo) -> String {
    format!(
        "{} slot '{}' refers to unknown data type '{}'",
        slot.direction.as_str(),
        slot.name,
        slot.data_type
    )
}

impl fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("registered", &self.registered.len())
            .field("failed", &self.failed.len())
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish()
    }
}
