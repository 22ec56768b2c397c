/// Imports this crate's prelude.
#[macro_export]
macro_rules! prelude {
    ($($imports:tt)*) => (
        use $crate::prelude::{*, $($imports)*};
    )
}

pub use std::{
    borrow::Cow,
    fmt::{self, Display},
    io,
    mem,
};

pub use log;
pub use smallvec::{smallvec, SmallVec};

#[macro_use]
pub mod res;

pub use crate::{
    bail,
    cast::{self, Container, Feature, Kml},
    ctx::{self, Ctx},
    error, parser,
    prelude::res::{Res, WithCtx},
    repr::{self, idx, Element, Typ},
    traits::*,
    walk,
};
