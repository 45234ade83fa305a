//! Plan service: the single entry point both UIs call.
//!
//! Checks the credential before anything else, then loads the knowledge
//! base and runs the orchestrator once.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::error::{LlmError, PlanError};
use crate::knowledge::KnowledgeBase;
use crate::llm::{LlmProvider, create_provider};
use crate::pipeline::{Orchestrator, PipelineConfig, PlanResult, ProgressSender};
use crate::profile::UserProfile;

pub struct PlanService {
    /// `None` when no credential is configured.
    orchestrator: Option<Orchestrator>,
    credential_env_var: String,
    knowledge: KnowledgeBase,
}

impl PlanService {
    /// Build the service from configuration.
    ///
    /// Without a credential the service still starts; every request then
    /// fails the pre-flight check.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, LlmError> {
        let llm = match config.llm.provider_config() {
            Some(llm_config) => Some(create_provider(&llm_config)?),
            None => {
                warn!(
                    env_var = config.llm.credential_env_var(),
                    "No API key configured; plan requests will be rejected"
                );
                None
            }
        };
        Ok(Self::new(llm, config))
    }

    /// Build the service around an existing provider.
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, config: &PlannerConfig) -> Self {
        let pipeline_config = PipelineConfig::from(&config.llm);
        Self {
            orchestrator: llm.map(|llm| Orchestrator::new(llm, pipeline_config)),
            credential_env_var: config.llm.credential_env_var().to_string(),
            knowledge: KnowledgeBase::new(config.knowledge_dir.clone()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// Generate a plan for a profile.
    pub async fn generate(
        &self,
        profile: &UserProfile,
        progress: Option<&ProgressSender>,
    ) -> Result<PlanResult, PlanError> {
        let Some(orchestrator) = &self.orchestrator else {
            return Err(PlanError::MissingCredential {
                env_var: self.credential_env_var.clone(),
            });
        };

        info!(
            transportation = profile.transportation(),
            diet = profile.diet(),
            energy_usage = profile.energy_usage(),
            goals = profile.goals(),
            "Plan requested"
        );

        let documents = self.knowledge.load().await?;
        let plan = orchestrator.run(profile, &documents, progress).await?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::pipeline::orchestrator::tests::ScriptedLlm;

    fn config_with_docs(dir: &std::path::Path) -> PlannerConfig {
        PlannerConfig {
            knowledge_dir: dir.to_path_buf(),
            ..PlannerConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_credential_rejects_without_progress() {
        let tmp = tempfile::tempdir().unwrap();
        let service = PlanService::new(None, &config_with_docs(tmp.path()));
        assert!(!service.has_credential());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = service
            .generate(&UserProfile::example(), Some(&tx))
            .await
            .unwrap_err();
        drop(tx);

        assert!(matches!(err, PlanError::MissingCredential { ref env_var } if env_var == "OPENAI_API_KEY"));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn from_config_without_key_has_no_provider() {
        let service = PlanService::from_config(&PlannerConfig::default()).unwrap();
        assert!(!service.has_credential());
    }

    #[tokio::test]
    async fn knowledge_documents_reach_first_step() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("energy.md"),
            "Heat pumps cut heating emissions by 50-70%.",
        )
        .unwrap();

        let llm = Arc::new(ScriptedLlm::new());
        let service = PlanService::new(
            Some(Arc::clone(&llm) as Arc<dyn LlmProvider>),
            &config_with_docs(tmp.path()),
        );
        let plan = service.generate(&UserProfile::example(), None).await.unwrap();

        assert_eq!(plan.final_output, "OUTPUT-4");
        let prompts = llm.user_prompts();
        assert!(prompts[0].contains("Heat pumps cut heating emissions"));
        assert!(!prompts[1].contains("Heat pumps"));
    }

    #[tokio::test]
    async fn pipeline_failure_surfaces_as_plan_error() {
        let tmp = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedLlm::failing_on(3));
        let service = PlanService::new(
            Some(Arc::clone(&llm) as Arc<dyn LlmProvider>),
            &config_with_docs(tmp.path()),
        );
        let err = service
            .generate(&UserProfile::example(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Pipeline(_)));
        assert!(err.user_message().starts_with("❌ Error: "));
        assert_eq!(llm.calls(), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn knowledge_read_failure_aborts_before_any_step() {
        let config = PlannerConfig {
            knowledge_dir: std::path::PathBuf::from("knowledge\0base"),
            ..PlannerConfig::default()
        };
        let llm = Arc::new(ScriptedLlm::new());
        let service = PlanService::new(Some(Arc::clone(&llm) as Arc<dyn LlmProvider>), &config);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = service
            .generate(&UserProfile::example(), Some(&tx))
            .await
            .unwrap_err();
        drop(tx);

        assert!(matches!(err, PlanError::Knowledge(_)));
        assert!(err.user_message().starts_with("❌ Error: "));
        assert!(err.hint().is_some());
        assert_eq!(llm.calls(), 0);
        assert!(rx.recv().await.is_none());
    }
}
