use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 4;

/// Path parameters extracted by a match, names shared with the route table.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route in the table: method, templated path, and the handler it binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path template, e.g. `/api/forms/{id}`
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Raw (still percent-encoded) path parameter values
    pub path_params: ParamVec,
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name, last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

struct CompiledRoute {
    method: Method,
    regex: Regex,
    meta: Arc<RouteMeta>,
    param_names: Vec<Arc<str>>,
}

/// Matches requests against a fixed table of routes.
///
/// Templates are compiled to anchored regexes once at construction. Routes
/// are tried longest template first so `/api/forms/{id}` never shadows a
/// longer literal sibling.
#[derive(Clone)]
pub struct Router {
    routes: Arc<Vec<CompiledRoute>>,
}

impl Router {
    /// Compile a routing table.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a template produces an invalid pattern
    /// (only possible with regex metacharacters in literal segments).
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let mut routes = routes;
        routes.sort_by_key(|r| std::cmp::Reverse(r.path_pattern.len()));

        let compiled = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern)?;
                Ok(CompiledRoute {
                    method: route.method.clone(),
                    regex,
                    meta: Arc::new(route),
                    param_names: param_names.into_iter().map(Arc::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let routes_summary: Vec<String> = compiled
            .iter()
            .map(|r| format!("{} {}", r.method, r.meta.path_pattern))
            .collect();
        info!(
            routes_count = compiled.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self {
            routes: Arc::new(compiled),
        })
    }

    /// Iterate over the table in match order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|r| r.meta.as_ref())
    }

    /// Print the table to stdout.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for r in self.routes.iter() {
            println!("[route] {} {} -> {}", r.method, r.meta.path_pattern, r.meta.handler_name);
        }
    }

    /// Match a request, returning `None` when no route fits (a 404).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for compiled in self.routes.iter() {
            if compiled.method != *method {
                continue;
            }
            if let Some(captures) = compiled.regex.captures(path) {
                let mut params = ParamVec::new();
                for (i, name) in compiled.param_names.iter().enumerate() {
                    if let Some(val) = captures.get(i + 1) {
                        params.push((Arc::clone(name), val.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %compiled.meta.handler_name,
                    path_params = ?params,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: Arc::clone(&compiled.meta),
                    path_params: params,
                    handler_name: compiled.meta.handler_name.clone(),
                });
            }
        }

        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a path template into an anchored regex plus its parameter names.
    ///
    /// A trailing slash on the request is tolerated, as in most HTTP routers.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .to_string();
                pattern.push_str("/([^/]+)");
                param_names.push(param_name);
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push_str("/?$");
        Ok((Regex::new(&pattern)?, param_names))
    }
}
