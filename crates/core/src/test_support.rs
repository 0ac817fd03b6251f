//! In-memory doubles for the repository and collaborator traits, shared by
//! the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::config::VersioningConfig;
use crate::errors::{Collaborator, Error, NotFoundError, Result};
use crate::funds::{Fund, FundCatalogTrait, FundStatus};
use crate::lifecycle::{ActivationResult, GenerationStatus, LifecycleService};
use crate::migration::{InMemoryNoteStore, MigrationService};
use crate::products::{BoundProduct, ProductRegistryTrait, ProductStatus};
use crate::references::ReferenceGuard;
use crate::risk::RiskAggregator;
use crate::templates::{
    Allocation, Generation, GenerationDetailsUpdate, NewGenerationRecord, NewTemplate, Template,
    TemplateLocks, TemplateRepositoryTrait, TemplateService,
};

// =========================================================================
// Mock FundCatalog
// =========================================================================

#[derive(Clone, Default)]
pub struct MockFundCatalog {
    funds: Arc<Mutex<HashMap<String, Fund>>>,
    failing: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    calls: Arc<AtomicUsize>,
}

impl MockFundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fund(&self, id: &str, risk_factor: Option<i32>) {
        self.funds.lock().unwrap().insert(
            id.to_string(),
            Fund {
                id: id.to_string(),
                name: format!("{} Fund", id),
                isin: None,
                risk_factor,
                cost: None,
                status: FundStatus::Active,
            },
        );
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundCatalogTrait for MockFundCatalog {
    async fn resolve(&self, fund_id: &str) -> Result<Option<Fund>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(Error::unavailable(Collaborator::FundCatalog, "catalog offline"));
        }
        Ok(self.funds.lock().unwrap().get(fund_id).cloned())
    }
}

// =========================================================================
// Mock ProductRegistry
// =========================================================================

#[derive(Clone, Default)]
pub struct MockProductRegistry {
    products: Arc<Mutex<Vec<BoundProduct>>>,
    failing_generations: Arc<Mutex<HashSet<String>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &self,
        product_id: &str,
        generation_id: &str,
        status: ProductStatus,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) {
        self.products.lock().unwrap().push(BoundProduct {
            id: product_id.to_string(),
            name: format!("Product {}", product_id),
            client_name: Some("Client".to_string()),
            generation_id: generation_id.to_string(),
            status,
            start_date,
            end_date,
        });
    }

    pub fn bind_active(&self, product_id: &str, generation_id: &str) {
        self.bind(
            product_id,
            generation_id,
            ProductStatus::Active,
            Utc::now().date_naive(),
            None,
        );
    }

    pub fn fail_for(&self, generation_id: &str) {
        self.failing_generations
            .lock()
            .unwrap()
            .insert(generation_id.to_string());
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn generation_of(&self, product_id: &str) -> Option<String> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.generation_id.clone())
    }

    async fn check(&self, generation_id: &str) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_generations.lock().unwrap().contains(generation_id) {
            return Err(Error::unavailable(
                Collaborator::ProductRegistry,
                "registry offline",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRegistryTrait for MockProductRegistry {
    async fn count_by_generation(&self, generation_id: &str) -> Result<i64> {
        self.check(generation_id).await?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.generation_id == generation_id)
            .count() as i64)
    }

    async fn list_by_generation(&self, generation_id: &str) -> Result<Vec<BoundProduct>> {
        self.check(generation_id).await?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.generation_id == generation_id)
            .cloned()
            .collect())
    }

    async fn rebind(&self, product_id: &str, generation_id: &str) -> Result<BoundProduct> {
        self.check(generation_id).await?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| NotFoundError::Product(product_id.to_string()))?;
        product.generation_id = generation_id.to_string();
        Ok(product.clone())
    }
}

// =========================================================================
// In-memory TemplateRepository
// =========================================================================

#[derive(Default)]
struct RepositoryState {
    templates: Vec<Template>,
    generations: Vec<Generation>,
    sequences: HashMap<String, i32>,
}

#[derive(Clone, Default)]
pub struct InMemoryTemplateRepository {
    state: Arc<Mutex<RepositoryState>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active generations in the template, read without any lock
    /// other than the repository's own.
    pub fn active_count(&self, template_id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .generations
            .iter()
            .filter(|g| g.template_id == template_id && g.status == GenerationStatus::Active)
            .count()
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[async_trait]
impl TemplateRepositoryTrait for InMemoryTemplateRepository {
    fn get_templates(&self) -> Result<Vec<Template>> {
        Ok(self.state.lock().unwrap().templates.clone())
    }

    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn create_template(&self, template: NewTemplate) -> Result<Template> {
        let created = Template {
            id: template.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: template.name,
            created_at: now(),
        };
        self.state.lock().unwrap().templates.push(created.clone());
        Ok(created)
    }

    async fn rename_template(&self, id: &str, name: String) -> Result<Template> {
        let mut state = self.state.lock().unwrap();
        let template = state
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| NotFoundError::Template(id.to_string()))?;
        template.name = name;
        Ok(template.clone())
    }

    async fn delete_template(&self, id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.templates.len();
        state.templates.retain(|t| t.id != id);
        state.generations.retain(|g| g.template_id != id);
        Ok(before - state.templates.len())
    }

    fn get_generations(&self, template_id: &str) -> Result<Vec<Generation>> {
        let mut generations: Vec<Generation> = self
            .state
            .lock()
            .unwrap()
            .generations
            .iter()
            .filter(|g| g.template_id == template_id)
            .cloned()
            .collect();
        generations.sort_by_key(|g| g.sequence);
        Ok(generations)
    }

    fn get_generation(&self, id: &str) -> Result<Option<Generation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .generations
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }

    async fn create_generation(&self, record: NewGenerationRecord) -> Result<Generation> {
        let mut state = self.state.lock().unwrap();
        let sequence = state
            .sequences
            .entry(record.template_id.clone())
            .and_modify(|s| *s += 1)
            .or_insert(1);
        let ts = now();
        let generation = Generation {
            id: Uuid::new_v4().to_string(),
            template_id: record.template_id,
            sequence: *sequence,
            name: record.name,
            description: record.description,
            status: GenerationStatus::Draft,
            allocations: record.allocations,
            created_at: ts,
            updated_at: ts,
        };
        state.generations.push(generation.clone());
        Ok(generation)
    }

    async fn update_generation_details(
        &self,
        id: &str,
        update: GenerationDetailsUpdate,
    ) -> Result<Generation> {
        let mut state = self.state.lock().unwrap();
        let generation = state
            .generations
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| NotFoundError::Generation(id.to_string()))?;
        generation.name = update.name;
        generation.description = update.description;
        generation.updated_at = now();
        Ok(generation.clone())
    }

    async fn replace_allocations(
        &self,
        generation_id: &str,
        allocations: Vec<Allocation>,
    ) -> Result<Generation> {
        let mut state = self.state.lock().unwrap();
        let generation = state
            .generations
            .iter_mut()
            .find(|g| g.id == generation_id)
            .ok_or_else(|| NotFoundError::Generation(generation_id.to_string()))?;
        generation.allocations = allocations;
        generation.updated_at = now();
        Ok(generation.clone())
    }

    async fn delete_generation(&self, id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.generations.len();
        state.generations.retain(|g| g.id != id);
        Ok(before - state.generations.len())
    }

    async fn activate_generation(&self, generation_id: &str) -> Result<ActivationResult> {
        let mut state = self.state.lock().unwrap();
        let target = state
            .generations
            .iter()
            .find(|g| g.id == generation_id)
            .cloned()
            .ok_or_else(|| NotFoundError::Generation(generation_id.to_string()))?;
        target.status.ensure_transition(GenerationStatus::Active)?;

        let ts = now();
        let mut archived = None;
        let mut activated = None;
        for generation in state.generations.iter_mut() {
            if generation.template_id != target.template_id {
                continue;
            }
            if generation.id == generation_id {
                generation.status = GenerationStatus::Active;
                generation.updated_at = ts;
                activated = Some(generation.clone());
            } else if generation.status == GenerationStatus::Active {
                generation.status = GenerationStatus::Archived;
                generation.updated_at = ts;
                archived = Some(generation.clone());
            }
        }
        let activated =
            activated.ok_or_else(|| NotFoundError::Generation(generation_id.to_string()))?;
        Ok(ActivationResult {
            activated,
            archived,
        })
    }

    async fn archive_generation(&self, generation_id: &str) -> Result<Generation> {
        let mut state = self.state.lock().unwrap();
        let generation = state
            .generations
            .iter_mut()
            .find(|g| g.id == generation_id)
            .ok_or_else(|| NotFoundError::Generation(generation_id.to_string()))?;
        generation
            .status
            .ensure_transition(GenerationStatus::Archived)?;
        generation.status = GenerationStatus::Archived;
        generation.updated_at = now();
        Ok(generation.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =========================================================================
// Service harness
// =========================================================================

/// All services wired over the in-memory doubles, sharing one lock table.
pub struct Harness {
    pub repository: InMemoryTemplateRepository,
    pub catalog: MockFundCatalog,
    pub registry: MockProductRegistry,
    pub templates: TemplateService,
    pub lifecycle: LifecycleService,
    pub migration: MigrationService,
}

impl Harness {
    pub fn new() -> Self {
        let config = VersioningConfig {
            collaborator_timeout_ms: 500,
            ..Default::default()
        };
        let repository = InMemoryTemplateRepository::new();
        let catalog = MockFundCatalog::new();
        let registry = MockProductRegistry::new();
        let locks = Arc::new(TemplateLocks::new());

        let repository_arc: Arc<dyn TemplateRepositoryTrait> = Arc::new(repository.clone());
        let risk_aggregator = Arc::new(RiskAggregator::new(
            Arc::new(catalog.clone()),
            config.collaborator_timeout(),
        ));
        let reference_guard = Arc::new(ReferenceGuard::new(
            Arc::new(registry.clone()),
            config.collaborator_timeout(),
        ));

        let templates = TemplateService::new(
            repository_arc.clone(),
            risk_aggregator,
            reference_guard.clone(),
            locks.clone(),
            config.clone(),
        );
        let lifecycle = LifecycleService::new(
            repository_arc.clone(),
            reference_guard.clone(),
            locks.clone(),
        );
        let migration = MigrationService::new(
            repository_arc,
            Arc::new(registry.clone()),
            reference_guard,
            Arc::new(InMemoryNoteStore::new()),
            locks,
            config,
        );

        Self {
            repository,
            catalog,
            registry,
            templates,
            lifecycle,
            migration,
        }
    }
}
