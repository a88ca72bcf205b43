//! The immutable template set used for every cycle.
//!
//! Plans are compiled once when the bank is built. Compiled templates sit
//! behind `Arc` so worker tasks can hold them without copying pixel data.

use crate::template::{Template, TemplateId, TemplatePlan};
use crate::util::{GridMatchError, GridMatchResult};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Template together with its precomputed scoring plan.
#[derive(Debug)]
pub struct CompiledTemplate {
    template: Template,
    plan: TemplatePlan,
}

impl CompiledTemplate {
    pub fn compile(template: Template) -> Self {
        let plan = TemplatePlan::compile(&template);
        Self { template, plan }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }
}

/// Ordered, immutable collection of compiled templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateBank {
    templates: Vec<Arc<CompiledTemplate>>,
}

impl TemplateBank {
    /// Compiles `templates`, rejecting duplicate identifiers.
    ///
    /// An empty bank is valid; every cycle then returns an empty map.
    pub fn new(templates: Vec<Template>) -> GridMatchResult<Self> {
        let mut seen = BTreeSet::new();
        for tpl in &templates {
            if !seen.insert(tpl.id()) {
                return Err(GridMatchError::DuplicateTemplateId { id: tpl.id().0 });
            }
        }
        let templates = templates
            .into_iter()
            .map(|tpl| Arc::new(CompiledTemplate::compile(tpl)))
            .collect();
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledTemplate>> {
        self.templates.iter()
    }

    pub fn get(&self, id: TemplateId) -> Option<&Arc<CompiledTemplate>> {
        self.templates.iter().find(|c| c.template().id() == id)
    }
}
