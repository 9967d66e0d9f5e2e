//! Comprehensive tests for the extended context.

#[cfg(test)]
mod tests {
    use crate::config::{ContextSettings, OrganizationServiceSettings};
    use crate::context::{ExtendedContext, ServiceProvider};
    use crate::core::{
        Entity, EntityImageCollection, IsolationMode, ParameterCollection, PipelineStage,
        PRE_IMAGE, TARGET,
    };
    use crate::errors::{Collaborator, ContextError, ServiceFault};
    use crate::events::{EventHandler, RegisteredEvent};
    use crate::services::{OrganizationRequest, ServiceIdentity};
    use crate::testing::{
        FailingTransport, PanickingTransport, RawContextBuilder, RecordingServiceFactory,
        StaticServiceProvider, TestPlugin,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use uuid::Uuid;

    fn create_plugin() -> TestPlugin {
        TestPlugin::new(vec![RegisteredEvent::new(PipelineStage::PreOperation, "Create")])
    }

    fn create_raw() -> RawContextBuilder {
        RawContextBuilder::new(PipelineStage::PreOperation, "Create", "account")
    }

    fn build(provider: StaticServiceProvider, plugin: &TestPlugin) -> ExtendedContext {
        ExtendedContext::builder()
            .service_provider(Arc::new(provider))
            .plugin(plugin)
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_plugin_is_argument_error() {
        let provider: Arc<dyn ServiceProvider> = Arc::new(StaticServiceProvider::new(create_raw().build()));
        let err = ExtendedContext::builder().service_provider(provider).build().unwrap_err();

        match err {
            ContextError::Argument(arg) => assert_eq!(arg.parameter, "plugin"),
            other => panic!("expected argument error, got {other}"),
        }
    }

    #[test]
    fn test_missing_provider_is_argument_error() {
        let plugin = create_plugin();
        let err = ExtendedContext::builder().plugin(&plugin).build().unwrap_err();

        match err {
            ContextError::Argument(arg) => assert_eq!(arg.parameter, "service_provider"),
            other => panic!("expected argument error, got {other}"),
        }
    }

    #[test]
    fn test_argument_check_happens_before_resolution() {
        let err = ExtendedContext::builder().build().unwrap_err();
        assert!(matches!(err, ContextError::Argument(_)));
    }

    #[test]
    fn test_missing_execution_context_is_configuration_error() {
        let plugin = create_plugin();
        let err = ExtendedContext::builder()
            .service_provider(Arc::new(StaticServiceProvider::empty()))
            .plugin(&plugin)
            .build()
            .unwrap_err();

        match err {
            ContextError::Configuration(cfg) => assert_eq!(cfg.collaborator, Collaborator::ExecutionContext),
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[test]
    fn test_wildcard_event_resolved_at_construction() {
        let h1 = EventHandler::new("H1", |_| Ok(()));
        let h2 = EventHandler::new("H2", |_| Ok(()));
        let plugin = TestPlugin::new(vec![
            RegisteredEvent::new(PipelineStage::PreOperation, "Update").with_handler(h1),
            RegisteredEvent::any(PipelineStage::PreOperation).with_handler(h2.clone()),
        ]);

        let ctx = build(StaticServiceProvider::new(create_raw().build()), &plugin);

        assert_eq!(ctx.event().message(), "Create");
        assert_eq!(ctx.event().stage(), PipelineStage::PreOperation);
        assert!(ctx.event().handler().unwrap().ptr_eq(&h2));
    }

    #[test]
    fn test_unregistered_event_fails_construction() {
        let plugin = TestPlugin::new(vec![RegisteredEvent::new(PipelineStage::PostOperation, "Create")]);
        let raw = RawContextBuilder::new(PipelineStage::PostOperation, "Delete", "account").build();

        let err = ExtendedContext::builder()
            .service_provider(Arc::new(StaticServiceProvider::new(raw)))
            .plugin(&plugin)
            .build()
            .unwrap_err();

        match err {
            ContextError::UnregisteredEvent(e) => {
                assert_eq!(e.message, "Delete");
                assert!(e.plugin.ends_with("TestPlugin"));
            }
            other => panic!("expected unregistered event, got {other}"),
        }
    }

    #[test]
    fn test_construction_does_not_touch_factory() {
        let (provider, factory, transport) = StaticServiceProvider::full(create_raw().build());
        let _ctx = build(provider, &create_plugin());

        assert_eq!(factory.call_count(), 0);
        assert!(transport.is_empty());
    }

    #[test]
    fn test_services_are_cached_per_identity() {
        let user = Uuid::new_v4();
        let initiating = Uuid::new_v4();
        let raw = create_raw().users(user, initiating).build();
        let (provider, factory, _) = StaticServiceProvider::full(raw);
        let ctx = build(provider, &create_plugin());

        let a = ctx.organization_service().unwrap();
        let b = ctx.organization_service().unwrap();
        let c = ctx.resolve_service(ServiceIdentity::RegisteredUser).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));

        let initiating_service = ctx.initiating_user_organization_service().unwrap();
        let system = ctx.system_organization_service().unwrap();
        assert!(!Arc::ptr_eq(&a, &initiating_service));
        assert!(!Arc::ptr_eq(&a, &system));
        ctx.system_organization_service().unwrap();

        assert_eq!(factory.requested_users(), vec![Some(user), Some(initiating), None]);
    }

    #[test]
    fn test_service_without_factory_is_configuration_error() {
        let provider = StaticServiceProvider::new(create_raw().build())
            .with_transport(Arc::new(FailingTransport::new()));
        let ctx = build(provider, &create_plugin());

        let err = ctx.system_organization_service().unwrap_err();
        assert!(matches!(
            err,
            ContextError::Configuration(ref cfg) if cfg.collaborator == Collaborator::ServiceFactory
        ));
    }

    #[test]
    fn test_service_without_transport_is_configuration_error() {
        let provider = StaticServiceProvider::new(create_raw().build())
            .with_factory(Arc::new(RecordingServiceFactory::new()));
        let ctx = build(provider, &create_plugin());

        let err = ctx.organization_service().unwrap_err();
        assert!(matches!(
            err,
            ContextError::Configuration(ref cfg) if cfg.collaborator == Collaborator::TracingService
        ));
    }

    #[test]
    fn test_factory_fault_is_configuration_error() {
        let provider = StaticServiceProvider::new(create_raw().build())
            .with_factory(Arc::new(RecordingServiceFactory::failing(ServiceFault::new("timeout"))))
            .with_transport(Arc::new(FailingTransport::new()));
        let ctx = build(provider, &create_plugin());

        let err = ctx.organization_service().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_trace_with_always_failing_transport() {
        let transport = Arc::new(FailingTransport::new());
        let provider = StaticServiceProvider::new(create_raw().build()).with_transport(transport.clone());
        let ctx = build(provider, &create_plugin());

        ctx.trace("x");
        ctx.trace_format("{0} {1}", &[&"only one"]);
        drop(ctx.start_timer("t"));

        assert!(transport.attempts() > 0);
    }

    #[test]
    fn test_trace_with_panicking_transport() {
        let provider = StaticServiceProvider::new(create_raw().build())
            .with_transport(Arc::new(PanickingTransport::new()));
        let ctx = build(provider, &create_plugin());

        ctx.trace("x");
        ctx.log_error(&ServiceFault::new("boom"));
    }

    #[test]
    fn test_trace_without_transport_is_silent() {
        let ctx = build(StaticServiceProvider::new(create_raw().build()), &create_plugin());
        ctx.trace("nobody listens");
        assert!(!ctx.logger().is_enabled());
    }

    #[test]
    fn test_resolved_service_traces_through_context_transport() {
        let (provider, _, transport) = StaticServiceProvider::full(create_raw().build());
        let ctx = build(provider, &create_plugin());

        let response = ctx
            .organization_service()
            .unwrap()
            .execute(&OrganizationRequest::new("WhoAmI"))
            .unwrap();

        assert_eq!(response.response_name, "WhoAmI");
        assert_eq!(transport.lines(), vec!["Executing WhoAmI request as registered_user".to_string()]);
    }

    #[test]
    fn test_settings_flow_to_services_and_timers() {
        let (provider, _, transport) = StaticServiceProvider::full(create_raw().build());
        let settings = ContextSettings::new()
            .with_trace_timer_start(false)
            .with_organization_service(OrganizationServiceSettings::new().with_trace_requests(false));
        let plugin = create_plugin();
        let ctx = ExtendedContext::builder()
            .service_provider(Arc::new(provider))
            .plugin(&plugin)
            .settings(settings)
            .build()
            .unwrap();

        ctx.system_organization_service()
            .unwrap()
            .execute(&OrganizationRequest::new("WhoAmI"))
            .unwrap();
        drop(ctx.start_timer("quiet"));

        let lines = transport.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Timer Ended"));
    }

    #[test]
    fn test_primary_entity_is_rebuilt_and_equal() {
        let ctx = build(StaticServiceProvider::new(create_raw().build()), &create_plugin());

        let first = ctx.primary_entity();
        let second = ctx.primary_entity();

        assert_eq!(first, second);
        assert_eq!(first.logical_name, "account");
        assert_eq!(first.id, ctx.primary_entity_id());
    }

    #[test]
    fn test_isolation_mode_derived_from_raw_value() {
        let sandboxed = build(
            StaticServiceProvider::new(create_raw().isolation_mode(2).build()),
            &create_plugin(),
        );
        let unknown = build(
            StaticServiceProvider::new(create_raw().isolation_mode(9).build()),
            &create_plugin(),
        );

        assert_eq!(sandboxed.isolation_mode(), IsolationMode::Sandbox);
        assert_eq!(unknown.isolation_mode(), IsolationMode::Unknown(9));
    }

    #[test]
    fn test_accessors_forward_to_raw_view() {
        let user = Uuid::new_v4();
        let initiating = Uuid::new_v4();
        let raw = create_raw().users(user, initiating).secondary_entity("contact").build();
        let correlation = raw.correlation_id;
        let ctx = build(StaticServiceProvider::new(raw), &create_plugin());

        assert_eq!(ctx.stage(), PipelineStage::PreOperation);
        assert_eq!(ctx.message_name(), "Create");
        assert_eq!(ctx.primary_entity_name(), "account");
        assert_eq!(ctx.secondary_entity_name(), Some("contact"));
        assert_eq!(ctx.user_id(), user);
        assert_eq!(ctx.initiating_user_id(), initiating);
        assert_eq!(ctx.correlation_id(), correlation);
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.organization_name(), "test-org");
    }

    #[test]
    fn test_images_and_target() {
        let pre = Entity::new("account", Uuid::new_v4()).with_attribute("name", serde_json::json!("Old"));
        let target = Entity::new("account", pre.id).with_attribute("name", serde_json::json!("New"));
        let raw = create_raw()
            .pre_images(EntityImageCollection::new().with_image(PRE_IMAGE, pre.clone()))
            .input_parameters(ParameterCollection::new().with(TARGET, serde_json::to_value(&target).unwrap()))
            .build();
        let ctx = build(StaticServiceProvider::new(raw), &create_plugin());

        assert_eq!(ctx.pre_image(), Some(&pre));
        assert!(ctx.post_image().is_none());
        assert_eq!(ctx.target(), Some(target));
    }

    #[test]
    fn test_parent_context_is_not_owned() {
        let parent = Arc::new(RawContextBuilder::new(PipelineStage::PostOperation, "Update", "account").build());
        let raw = RawContextBuilder::new(PipelineStage::PreOperation, "Create", "task")
            .parent(&parent)
            .build();
        let plugin = TestPlugin::new(vec![RegisteredEvent::any(PipelineStage::PreOperation)]);
        let ctx = build(StaticServiceProvider::new(raw), &plugin);

        assert_eq!(ctx.parent_context().unwrap().message_name, "Update");
        assert!(ctx.context_info().contains("Parent Context: PostOperation Update account"));

        drop(parent);
        assert!(ctx.parent_context().is_none());
    }

    #[test]
    fn test_context_info_describes_invocation() {
        let raw = create_raw()
            .input_parameters(ParameterCollection::new().with("Count", serde_json::json!(3)))
            .build();
        let ctx = build(StaticServiceProvider::new(raw), &create_plugin());

        let info = ctx.context_info();
        assert!(info.starts_with("**** Context Info ****"));
        assert!(info.contains("Plugin: "));
        assert!(info.contains("   Message: Create"));
        assert!(info.contains("   Count: 3"));
        assert!(info.contains("Pre Entity Images: (none)"));
        assert!(info.ends_with("**** End Context Info ****"));
    }

    #[test]
    fn test_log_error_traces_chain_and_context() {
        let (provider, _, transport) = StaticServiceProvider::full(create_raw().build());
        let ctx = build(provider, &create_plugin());

        let err: ContextError = crate::errors::ConfigurationError::failed(
            Collaborator::OrganizationService,
            ServiceFault::new("socket closed"),
        )
        .into();
        ctx.log_error(&err);

        let lines = transport.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Exception: Unable to obtain the organization service"));
        assert!(lines[0].contains("Caused by: socket closed"));
        assert!(lines[1].starts_with("**** Context Info ****"));
    }
}
