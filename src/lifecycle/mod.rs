//! Test group lifecycle operations
//!
//! Three entry points, each a fresh invocation that logs in first:
//! - `create`: resolve names, create the group, wait for it and report
//! - `delete`: remove the group recorded in the runtime state
//! - `creation_validation`: everything `create` does before submitting

mod poll;
pub mod report;

use serde_json::Value;

use crate::common::config::{PollConfig, Settings};
use crate::common::{is_blank, Error, Result};
use crate::properties::{NodeProperties, TestGroupConfig};
use crate::resolver;
use crate::service::{display_id, GroupStatus, TestResults, TestService};
use crate::session;
use crate::state::RuntimeState;

pub use poll::poll_until;

/// Runtime state key holding the id of the created test group
pub const TESTGROUP_ID: &str = "testgroup_id";

/// Everything an operation needs from its caller
#[derive(Debug)]
pub struct InvocationContext {
    pub properties: NodeProperties,
    pub settings: Settings,
    pub state: RuntimeState,
}

impl InvocationContext {
    pub fn new(properties: NodeProperties, settings: Settings, state: RuntimeState) -> Self {
        Self {
            properties,
            settings,
            state,
        }
    }
}

/// Outcome of a test group run that passed
#[derive(Debug, Clone)]
pub struct RunReport {
    pub testgroup_id: Value,
    pub test_id: Value,
    pub status: GroupStatus,
    pub results: TestResults,
}

/// Create the test group, wait for it to finish and report its results
pub async fn create(ctx: &mut InvocationContext) -> Result<RunReport> {
    let service = session::login(&ctx.properties.auth, &ctx.settings.service)?;
    LifecycleDriver::new(&service, &ctx.settings.poll)
        .create(&ctx.properties, &mut ctx.state)
        .await
}

/// Delete the test group recorded in the runtime state, if any
pub async fn delete(ctx: &mut InvocationContext) -> Result<Option<Value>> {
    let service = session::login(&ctx.properties.auth, &ctx.settings.service)?;
    LifecycleDriver::new(&service, &ctx.settings.poll)
        .delete(&mut ctx.state)
        .await
}

/// Check the properties and resolve all names without creating anything
pub async fn creation_validation(ctx: &InvocationContext) -> Result<TestGroupConfig> {
    let service = session::login(&ctx.properties.auth, &ctx.settings.service)?;
    LifecycleDriver::new(&service, &ctx.settings.poll)
        .creation_validation(&ctx.properties)
        .await
}

/// Runs the lifecycle steps against a logged-in service
pub struct LifecycleDriver<'a, S: TestService> {
    service: &'a S,
    poll: PollConfig,
}

impl<'a, S: TestService> LifecycleDriver<'a, S> {
    pub fn new(service: &'a S, poll: &PollConfig) -> Self {
        Self {
            service,
            poll: poll.clone(),
        }
    }

    /// Validate the properties and build the resolved test group document
    async fn prepare(&self, properties: &NodeProperties) -> Result<TestGroupConfig> {
        let tests = match &properties.tests {
            Some(tests) if !tests.is_empty() => tests.clone(),
            _ => return Err(Error::MissingField("test list")),
        };
        let name = match &properties.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => return Err(Error::MissingField("name")),
        };

        tracing::info!("get probes list");
        let probes = self.service.genalyzer_list().await?;

        tracing::info!("get script types list");
        let scripts = self.service.testing_script_list().await?;

        let mut config = TestGroupConfig {
            name,
            description: properties.description.clone().unwrap_or_default(),
            tests,
        };

        tracing::info!("try to generate test group");
        resolver::resolve_test_group(&mut config, &probes, &scripts)?;
        Ok(config)
    }

    pub async fn creation_validation(&self, properties: &NodeProperties) -> Result<TestGroupConfig> {
        let config = self.prepare(properties).await?;
        tracing::info!(
            "test group '{}' is valid ({} tests)",
            config.name,
            config.tests.len()
        );
        Ok(config)
    }

    pub async fn create(
        &self,
        properties: &NodeProperties,
        state: &mut RuntimeState,
    ) -> Result<RunReport> {
        let config = self.prepare(properties).await?;

        tracing::info!("create test group");
        let testgroup_id = self.service.testgroup_create(&config).await?;
        state.insert(TESTGROUP_ID, testgroup_id.clone());
        state.save()?;
        tracing::info!("created test group {}", display_id(&testgroup_id));

        let service = self.service;
        let id = &testgroup_id;
        let status = poll_until(
            move || service.testgroup_get_status(id),
            self.poll.interval(),
            |status: &GroupStatus| !status.is_running(),
            self.poll.max_attempts,
        )
        .await?;

        // Only the first test of the group is reported
        let test_id = status
            .tests
            .first()
            .map(|test| test.id.clone())
            .ok_or_else(|| Error::NoTestsInStatus {
                group_id: display_id(&testgroup_id),
            })?;

        let results = self.service.testing_get_results(&test_id, None).await?;

        tracing::info!("test result: {}", report::format_results(&results));
        tracing::info!("{}", report::format_log_block(&results.log, &chrono::Local));

        if !status.is_passed() {
            tracing::warn!(
                "test group {} finished with status {}",
                display_id(&testgroup_id),
                status
            );
            return Err(Error::TestFailed {
                status: status.status,
            });
        }

        Ok(RunReport {
            testgroup_id,
            test_id,
            status,
            results,
        })
    }

    /// Returns the id that was deleted
    pub async fn delete(&self, state: &mut RuntimeState) -> Result<Option<Value>> {
        let testgroup_id = state.get(TESTGROUP_ID).filter(|id| !is_blank(id)).cloned();
        let Some(testgroup_id) = testgroup_id else {
            tracing::debug!("no test group recorded, nothing to delete");
            return Ok(None);
        };

        tracing::info!("Delete test group");
        self.service
            .testgroup_delete(std::slice::from_ref(&testgroup_id))
            .await?;

        state.remove(TESTGROUP_ID);
        state.save()?;
        Ok(Some(testgroup_id))
    }
}
