macro_rules! id {
    ($t:ty) => {
        ::std::any::TypeId::of::<$t>()
    };
}

mod once_cell;

pub(crate) use once_cell::OnceCell;
