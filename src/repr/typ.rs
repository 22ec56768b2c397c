//! Element type tags and their capability table.

prelude! {}

/// Capabilities of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    /// Element is a Feature: it has a type label, an optional name and visibility.
    pub feature: bool,
    /// Element holds an ordered list of child features.
    pub container: bool,
}

macro_rules! kml_types {
    ( $(
        $(#[$meta:meta])*
        $variant:ident = $prefix:literal : $local:literal {
            feature: $feature:expr,
            container: $container:expr $(,)?
        }
    ),* $(,)? ) => {
        /// Type tag of an element.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Typ {
            $( $(#[$meta])* $variant, )*
            /// Any element this crate does not model.
            Other,
        }

        impl Typ {
            /// All modeled types, [`Typ::Other`] excluded.
            pub const ALL: &'static [Typ] = &[ $( Typ::$variant, )* ];

            /// Capability table entry.
            pub const fn caps(self) -> Caps {
                match self {
                    $(
                        Typ::$variant => Caps {
                            feature: $feature,
                            container: $container,
                        },
                    )*
                    Typ::Other => Caps {
                        feature: false,
                        container: false,
                    },
                }
            }

            /// Prefix required when recognizing this type, empty if any prefix matches.
            pub const fn xml_prefix(self) -> &'static str {
                match self {
                    $( Typ::$variant => $prefix, )*
                    Typ::Other => "",
                }
            }

            /// Local XML name.
            pub const fn xml_local(self) -> &'static str {
                match self {
                    $( Typ::$variant => $local, )*
                    Typ::Other => "",
                }
            }

            /// Recognizes an element from its qualified name.
            ///
            /// Prefixes are ignored except for types that require one, like `gx:Tour`.
            pub fn from_xml_name(prefix: &str, local: &str) -> Self {
                $(
                    if local == $local && ($prefix.is_empty() || prefix == $prefix) {
                        return Typ::$variant;
                    }
                )*
                Typ::Other
            }
        }
    };
}

kml_types! {
    /// The `<kml>` root, holds at most one feature.
    Kml = "" : "kml" { feature: false, container: false },
    Document = "" : "Document" { feature: true, container: true },
    Folder = "" : "Folder" { feature: true, container: true },
    Placemark = "" : "Placemark" { feature: true, container: false },
    NetworkLink = "" : "NetworkLink" { feature: true, container: false },
    GroundOverlay = "" : "GroundOverlay" { feature: true, container: false },
    ScreenOverlay = "" : "ScreenOverlay" { feature: true, container: false },
    PhotoOverlay = "" : "PhotoOverlay" { feature: true, container: false },
    Tour = "gx" : "Tour" { feature: true, container: false },
}

impl Typ {
    #[inline]
    pub const fn is_feature(self) -> bool {
        self.caps().feature
    }
    #[inline]
    pub const fn is_container(self) -> bool {
        self.caps().container
    }
    #[inline]
    pub const fn is_kml(self) -> bool {
        matches!(self, Typ::Kml)
    }
    /// True for types that own a child feature list, containers and `<kml>`.
    #[inline]
    pub const fn holds_features(self) -> bool {
        self.is_container() || self.is_kml()
    }
}

impl Display for Typ {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Typ::Other => "[other]".fmt(fmt),
            typ => {
                let prefix = typ.xml_prefix();
                if !prefix.is_empty() {
                    write!(fmt, "{}:", prefix)?;
                }
                typ.xml_local().fmt(fmt)
            }
        }
    }
}
