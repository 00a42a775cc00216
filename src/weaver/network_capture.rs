//! Network capture weaver
//!
//! Redirects web request sends and disposals, and HTTP client construction,
//! to logging-aware wrappers so requests are captured without source changes.

use serde::{Deserialize, Serialize};

use super::exclusion::ScopeExclusion;
use super::rewrite::{weave_type_tree, WrapperRule};
use super::{WeaveContext, Weaver};
use crate::ir::{CallKind, CompiledUnit, MethodRef, TypeHierarchy, VOID};
use crate::utils::Result;

pub const NETWORK_CAPTURE: &str = "EmbraceSDK.Networking.NetworkCapture";

pub const UNITY_WEB_REQUEST: &str = "UnityEngine.Networking.UnityWebRequest";
pub const UNITY_WEB_REQUEST_ASYNC_OPERATION: &str =
    "UnityEngine.Networking.UnityWebRequestAsyncOperation";
pub const HTTP_CLIENT: &str = "System.Net.Http.HttpClient";
pub const HTTP_MESSAGE_INVOKER: &str = "System.Net.Http.HttpMessageInvoker";
pub const HTTP_MESSAGE_HANDLER: &str = "System.Net.Http.HttpMessageHandler";
pub const IDISPOSABLE: &str = "System.IDisposable";
pub const OBJECT: &str = "System.Object";
pub const BOOLEAN: &str = "System.Boolean";

/// Platform the project is being compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    #[default]
    Android,
    Ios,
    Tvos,
    Standalone,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureOptions {
    #[serde(default)]
    pub platform: TargetPlatform,
    /// Weave web requests on iOS/tvOS too, to capture data processing errors
    #[serde(default)]
    pub capture_data_processing_errors: bool,
}

impl CaptureOptions {
    /// The native agent already records web requests on Apple platforms
    pub fn captures_web_requests(&self) -> bool {
        !matches!(self.platform, TargetPlatform::Ios | TargetPlatform::Tvos)
            || self.capture_data_processing_errors
    }
}

/// Weaver wrapping web request and HTTP client call sites
pub struct NetworkCaptureWeaver {
    rules: Vec<WrapperRule>,
    scope: ScopeExclusion,
}

impl NetworkCaptureWeaver {
    pub fn new(options: &CaptureOptions) -> Self {
        let mut rules = Vec::new();
        if options.captures_web_requests() {
            rules.push(send_web_request_rule());
            rules.push(dispose_web_request_rule());
        }
        rules.extend(http_client_rules());

        Self {
            rules,
            scope: ScopeExclusion::new(),
        }
    }

    pub fn rules(&self) -> &[WrapperRule] {
        &self.rules
    }
}

impl Default for NetworkCaptureWeaver {
    fn default() -> Self {
        Self::new(&CaptureOptions::default())
    }
}

impl Weaver for NetworkCaptureWeaver {
    fn name(&self) -> &'static str {
        "network-capture"
    }

    fn seed_types(&self, hierarchy: &mut TypeHierarchy) {
        hierarchy.declare(UNITY_WEB_REQUEST, Some(OBJECT), &[IDISPOSABLE]);
        hierarchy.declare(HTTP_MESSAGE_INVOKER, Some(OBJECT), &[IDISPOSABLE]);
        hierarchy.declare(HTTP_CLIENT, Some(HTTP_MESSAGE_INVOKER), &[]);
    }

    fn weave_unit(&self, unit: &mut CompiledUnit, ctx: &WeaveContext) -> Result<bool> {
        weave_type_tree(unit, &self.rules, &self.scope, ctx)
    }
}

// ==================== Rules ====================

fn send_web_request_rule() -> WrapperRule {
    let original =
        MethodRef::instance(UNITY_WEB_REQUEST, "SendWebRequest", &[], UNITY_WEB_REQUEST_ASYNC_OPERATION)
            .full_name();
    let wrapper = MethodRef::new(
        NETWORK_CAPTURE,
        "SendWebRequest",
        &[UNITY_WEB_REQUEST],
        UNITY_WEB_REQUEST_ASYNC_OPERATION,
    );
    WrapperRule::new("send-web-request", wrapper, move |site| Ok(site.callee_is(&original)))
        .with_call_kind(CallKind::Direct)
}

fn dispose_web_request_rule() -> WrapperRule {
    let direct = MethodRef::instance(UNITY_WEB_REQUEST, "Dispose", &[], VOID).full_name();
    // Disposal through a using block or a polymorphic reference goes through the interface
    let through_interface = MethodRef::instance(IDISPOSABLE, "Dispose", &[], VOID).full_name();
    let wrapper = MethodRef::new(NETWORK_CAPTURE, "DisposeWebRequest", &[IDISPOSABLE], VOID);

    WrapperRule::new("dispose-web-request", wrapper, move |site| {
        if site.callee_is(&direct) {
            return Ok(true);
        }
        if site.callee_is(&through_interface) {
            return site.receiver_is(UNITY_WEB_REQUEST);
        }
        Ok(false)
    })
    .with_call_kind(CallKind::Direct)
}

fn http_client_rules() -> Vec<WrapperRule> {
    let overloads: [(&'static str, &[&str]); 3] = [
        ("http-client", &[]),
        ("http-client-with-handler", &[HTTP_MESSAGE_HANDLER]),
        ("http-client-with-handler-and-dispose", &[HTTP_MESSAGE_HANDLER, BOOLEAN]),
    ];

    overloads
        .into_iter()
        .map(|(name, params)| {
            let original = MethodRef::constructor(HTTP_CLIENT, params).full_name();
            let wrapper =
                MethodRef::new(NETWORK_CAPTURE, "GetHttpClientWithLoggingHandler", params, HTTP_CLIENT);
            WrapperRule::new(name, wrapper, move |site| Ok(site.callee_is(&original)))
                .with_call_kind(CallKind::Direct)
        })
        .collect()
}
