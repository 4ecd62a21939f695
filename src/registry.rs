//! Plugin registry and detection.
//!
//! dayjs keeps most of moment's surface behind optional plugins. Each
//! [`PluginDescriptor`] names one plugin and describes how to recognize a
//! call/member site that needs it: membership of the accessed property in a
//! static name set, a structural [`Trigger`], or both (either suffices).
//! Descriptors are plain const records interpreted by [`detect`]; there is no
//! dynamic dispatch.

use crate::error::Error;

/// How a site is matched beyond plain property-name membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Constructor call whose first argument is an array literal.
    ArrayArgument,
    /// Constructor call, or one of the listed methods, whose first argument
    /// is an object literal.
    ObjectArgument { methods: &'static [&'static str] },
    /// One of the listed methods called with one of the listed string
    /// literals as its first argument.
    MethodArgument {
        methods: &'static [&'static str],
        args: &'static [&'static str],
    },
    /// One of the listed methods invoked directly on the library global.
    StaticMethod { methods: &'static [&'static str] },
}

/// Specialized replacement a descriptor can request for matched call sites,
/// taking precedence over the generic unit-normalization passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Normalize unit keys of object-literal arguments to singular form.
    NormalizeObjectKeys,
}

#[derive(Debug)]
pub struct PluginDescriptor {
    pub name: &'static str,
    /// Property/method names whose presence on a library-rooted chain
    /// requires this plugin.
    pub properties: &'static [&'static str],
    pub trigger: Option<Trigger>,
    pub rewrite: Option<Rewrite>,
    /// Capabilities dayjs has no equivalent for; matching one aborts the
    /// whole file.
    pub fatal: bool,
}

impl PluginDescriptor {
    const fn named(name: &'static str, properties: &'static [&'static str]) -> Self {
        PluginDescriptor {
            name,
            properties,
            trigger: None,
            rewrite: None,
            fatal: false,
        }
    }
}

pub static REGISTRY: &[PluginDescriptor] = &[
    PluginDescriptor {
        name: "arraySupport",
        properties: &[],
        trigger: Some(Trigger::ArrayArgument),
        rewrite: None,
        fatal: false,
    },
    PluginDescriptor::named("calendar", &["calendar"]),
    PluginDescriptor::named("dayOfYear", &["dayOfYear"]),
    PluginDescriptor::named("duration", &["duration", "isDuration", "humanize"]),
    PluginDescriptor::named("isBetween", &["isBetween"]),
    PluginDescriptor::named("isSameOrAfter", &["isSameOrAfter"]),
    PluginDescriptor::named("isSameOrBefore", &["isSameOrBefore"]),
    PluginDescriptor::named("localeData", &["localeData"]),
    PluginDescriptor::named("isLeapYear", &["isLeapYear", "isoWeeksInYear"]),
    PluginDescriptor {
        name: "isoWeek",
        properties: &["isoWeek", "isoWeekday", "isoWeekYear"],
        trigger: Some(Trigger::MethodArgument {
            methods: &["add", "subtract", "startOf", "endOf"],
            args: &["isoWeek"],
        }),
        rewrite: None,
        fatal: false,
    },
    PluginDescriptor::named("isoWeeksInYear", &["isoWeeksInYear"]),
    PluginDescriptor {
        name: "minMax",
        properties: &[],
        trigger: Some(Trigger::StaticMethod {
            methods: &["min", "max"],
        }),
        rewrite: None,
        fatal: false,
    },
    PluginDescriptor {
        name: "objectSupport",
        properties: &[],
        trigger: Some(Trigger::ObjectArgument {
            methods: &["utc", "set", "add", "subtract"],
        }),
        rewrite: Some(Rewrite::NormalizeObjectKeys),
        fatal: false,
    },
    // moment.parseZone has no dayjs counterpart; bail out instead of
    // producing code that silently drops the offset.
    PluginDescriptor {
        name: "parseZone",
        properties: &["parseZone"],
        trigger: None,
        rewrite: None,
        fatal: true,
    },
    PluginDescriptor {
        name: "quarterOfYear",
        properties: &["quarter"],
        trigger: Some(Trigger::MethodArgument {
            methods: &["add", "subtract", "startOf", "endOf"],
            args: &["quarter", "quarters"],
        }),
        rewrite: None,
        fatal: false,
    },
    PluginDescriptor::named("relativeTime", &["from", "fromNow", "to", "toNow", "humanize"]),
    PluginDescriptor::named("toArray", &["toArray"]),
    PluginDescriptor::named("toObject", &["toObject"]),
    PluginDescriptor::named("updateLocale", &["updateLocale"]),
    PluginDescriptor::named("utc", &["utc", "local"]),
    PluginDescriptor {
        name: "weekday",
        properties: &["weekday", "weekdays"],
        trigger: Some(Trigger::MethodArgument {
            methods: &["get", "set"],
            args: &["weekday", "weekdays"],
        }),
        rewrite: None,
        fatal: false,
    },
    PluginDescriptor::named("weekOfYear", &["week", "weekYear"]),
    PluginDescriptor::named("weekYear", &["weekYear"]),
];

// -----------------------------------------------------------------------------
// Detection
// -----------------------------------------------------------------------------

/// Shape of the first argument at a call site, as far as detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape<'a> {
    None,
    Array,
    Object,
    Str(&'a str),
    Other,
}

/// Structural summary of one library-rooted call or member site.
///
/// The chain root may already read `dayjs` by the time detection runs (the
/// rewrite works bottom-up), so the site only records *that* the receiver is
/// the library global, not which spelling it currently has.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    /// Accessed property/method name, when the site is a member access or a
    /// method call.
    pub property: Option<&'a str>,
    /// The receiver is the library global itself (`dayjs.max(...)`).
    pub static_receiver: bool,
    /// The site is a bare constructor call (`dayjs(...)`).
    pub constructor: bool,
    pub first_arg: ArgShape<'a>,
}

impl Trigger {
    fn matches(&self, site: &Site) -> bool {
        match self {
            Trigger::ArrayArgument => site.constructor && site.first_arg == ArgShape::Array,
            Trigger::ObjectArgument { methods } => {
                let callee_matches = site.constructor
                    || site.property.is_some_and(|p| methods.contains(&p));
                callee_matches && site.first_arg == ArgShape::Object
            }
            Trigger::MethodArgument { methods, args } => {
                site.property.is_some_and(|p| methods.contains(&p))
                    && matches!(site.first_arg, ArgShape::Str(s) if args.contains(&s))
            }
            Trigger::StaticMethod { methods } => {
                site.static_receiver && site.property.is_some_and(|p| methods.contains(&p))
            }
        }
    }
}

/// Every descriptor whose trigger matches the site, in registry order.
///
/// Pure function of the site: running it twice on the same node yields the
/// same result. A fatal descriptor aborts with
/// [`Error::UnsupportedCapability`].
pub fn detect(site: &Site) -> Result<Vec<&'static PluginDescriptor>, Error> {
    let mut matched = Vec::new();
    for plugin in REGISTRY {
        let by_name = site
            .property
            .is_some_and(|p| plugin.properties.contains(&p));
        let by_shape = plugin.trigger.is_some_and(|t| t.matches(site));
        if by_name || by_shape {
            if plugin.fatal {
                return Err(Error::UnsupportedCapability {
                    capability: plugin.name,
                });
            }
            matched.push(plugin);
        }
    }
    Ok(matched)
}
