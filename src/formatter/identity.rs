//! Resolve a readable "Target.method" identity for a call.
//!
//! Generated proxies are unwrapped to the type they stand in for. Generic
//! data-access implementations (see `ProxyRenameRule`) report the interface
//! they implement instead, so `SimpleJpaRepository.findAll` shows up as
//! `OrderRepository.findAll`.

use crate::utils::config::{
    GENERIC_REPOSITORY_SUFFIXES, GENERIC_REPOSITORY_TYPES, NO_TARGET, UNRESOLVABLE_TARGET,
};
use crate::utils::error::ResolveError;
use log::debug;
use std::borrow::Cow;

/// The object an instrumented call was made on
pub trait CallTarget {
    /// Simple name of the runtime type (possibly a generated proxy)
    fn type_name(&self) -> Cow<'_, str>;

    /// Whether the runtime type is a generated proxy that knows its implementation
    fn is_proxy(&self) -> bool {
        false
    }

    /// Simple name of the implementation behind a proxy; `Ok(None)` if unknown
    fn proxied_type_name(&self) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }

    /// Interfaces declared by the runtime type, in declaration order
    fn interface_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// What sits behind a proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxiedTarget {
    Known(String),
    Unknown,
    /// Looking it up fails with this message
    Unresolvable(String),
}

/// Plain description of a call target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub type_name: String,
    pub interfaces: Vec<String>,
    pub proxied: Option<ProxiedTarget>,
}

impl TargetDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            interfaces: Vec::new(),
            proxied: None,
        }
    }

    /// A proxy named `$Proxy<n>` in front of `target`
    pub fn proxy(target: ProxiedTarget) -> Self {
        Self {
            type_name: "$Proxy".to_string(),
            interfaces: Vec::new(),
            proxied: Some(target),
        }
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }
}

impl CallTarget for TargetDescriptor {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.type_name)
    }

    /// Only descriptors carrying proxied info are unwrapped; a bare
    /// `$Proxy42` reports its own name
    fn is_proxy(&self) -> bool {
        self.proxied.is_some()
    }

    fn proxied_type_name(&self) -> Result<Option<String>, ResolveError> {
        match &self.proxied {
            Some(ProxiedTarget::Known(name)) => Ok(Some(name.clone())),
            Some(ProxiedTarget::Unknown) => Ok(None),
            Some(ProxiedTarget::Unresolvable(reason)) => {
                Err(ResolveError::LookupFailed(reason.clone()))
            }
            None => Ok(None),
        }
    }

    fn interface_names(&self) -> Vec<String> {
        self.interfaces.clone()
    }
}

/// Matches implementation names that should be reported by interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRenameRule {
    Exact(String),
    Suffix(String),
}

impl ProxyRenameRule {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ProxyRenameRule::Exact(exact) => name == exact,
            ProxyRenameRule::Suffix(suffix) => name.ends_with(suffix.as_str()),
        }
    }
}

/// Default rule table: generic repository implementations
pub fn default_rename_rules() -> Vec<ProxyRenameRule> {
    GENERIC_REPOSITORY_TYPES
        .iter()
        .map(|name| ProxyRenameRule::Exact(name.to_string()))
        .chain(
            GENERIC_REPOSITORY_SUFFIXES
                .iter()
                .map(|suffix| ProxyRenameRule::Suffix(suffix.to_string())),
        )
        .collect()
}

/// Resolve the display name of a target
///
/// # Returns
/// The simple name, `[no target]` for free functions, or
/// `[target can't be resolved]` when proxy resolution fails
pub fn resolve_target_name(target: Option<&dyn CallTarget>, rules: &[ProxyRenameRule]) -> String {
    let target = match target {
        Some(target) => target,
        None => return NO_TARGET.to_string(),
    };

    if !target.is_proxy() {
        return target.type_name().into_owned();
    }

    match target.proxied_type_name() {
        Ok(name) => {
            let name = name.unwrap_or_default();
            if rules.iter().any(|rule| rule.matches(&name)) {
                if let Some(interface) = target.interface_names().into_iter().next() {
                    return interface;
                }
            }
            name
        }
        Err(e) => {
            debug!("Cannot resolve proxied target {}: {}", target.type_name(), e);
            UNRESOLVABLE_TARGET.to_string()
        }
    }
}

/// Build the "Target.method" identity of a call
pub fn format_identity(
    target: Option<&dyn CallTarget>,
    method_name: &str,
    rules: &[ProxyRenameRule],
) -> String {
    format!("{}.{}", resolve_target_name(target, rules), method_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(target: &TargetDescriptor, method: &str) -> String {
        format_identity(Some(target), method, &default_rename_rules())
    }

    #[test]
    fn test_plain_target() {
        let target = TargetDescriptor::new("OrderService");
        assert_eq!(identity(&target, "process"), "OrderService.process");
    }

    #[test]
    fn test_no_target() {
        assert_eq!(
            format_identity(None, "main", &default_rename_rules()),
            "[no target].main"
        );
    }

    #[test]
    fn test_proxy_resolves_to_implementation() {
        let target = TargetDescriptor::proxy(ProxiedTarget::Known("OrderServiceImpl".into()))
            .with_interface("OrderService");
        assert_eq!(identity(&target, "process"), "OrderServiceImpl.process");
    }

    #[test]
    fn test_generic_repository_reports_interface() {
        let jpa = TargetDescriptor::proxy(ProxiedTarget::Known("SimpleJpaRepository".into()))
            .with_interface("OrderRepository")
            .with_interface("Repository");
        assert_eq!(identity(&jpa, "findAll"), "OrderRepository.findAll");

        let custom = TargetDescriptor::proxy(ProxiedTarget::Known("CustomerRepositoryImpl".into()))
            .with_interface("CustomerRepository");
        assert_eq!(identity(&custom, "save"), "CustomerRepository.save");
    }

    #[test]
    fn test_generic_repository_without_interface_keeps_name() {
        let target = TargetDescriptor::proxy(ProxiedTarget::Known("SimpleJpaRepository".into()));
        assert_eq!(identity(&target, "count"), "SimpleJpaRepository.count");
    }

    #[test]
    fn test_unknown_proxied_type_is_empty() {
        let target = TargetDescriptor::proxy(ProxiedTarget::Unknown);
        assert_eq!(identity(&target, "run"), ".run");
    }

    #[test]
    fn test_unresolvable_proxy() {
        let target = TargetDescriptor::proxy(ProxiedTarget::Unresolvable("detached".into()));
        assert_eq!(identity(&target, "run"), "[target can't be resolved].run");
    }

    #[test]
    fn test_proxy_without_proxied_info_keeps_own_name() {
        let bare = TargetDescriptor::new("$Proxy42").with_interface("OrderRepository");
        assert!(!bare.is_proxy());
        assert_eq!(identity(&bare, "findAll"), "$Proxy42.findAll");
    }

    #[test]
    fn test_rules_only_apply_to_proxies() {
        let target = TargetDescriptor::new("SimpleJpaRepository").with_interface("OrderRepository");
        assert_eq!(identity(&target, "findAll"), "SimpleJpaRepository.findAll");
    }
}
