//! [`Walk`] for std types.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    hash::BuildHasher,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use super::{Child, ChildMut, Shape, ShapeMut, SharedWalk, Walk};

impl Walk for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Text(self)
    }
}

impl<T: Walk> Walk for Option<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_ref().map_or(Shape::Opaque, Walk::shape)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        self.as_mut().map_or(ShapeMut::Opaque, Walk::shape_mut)
    }
}

impl<T: Walk + ?Sized> Walk for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        (**self).shape_mut()
    }
}

macro_rules! impl_walk_sequence {
    ($($ty:ty => [$($generics:tt)*]),* $(,)?) => {
        $(
            impl<$($generics)*> Walk for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Children(self.iter().map(Child::new).collect())
                }

                fn shape_mut(&mut self) -> ShapeMut<'_> {
                    ShapeMut::Children(self.iter_mut().map(ChildMut::new).collect())
                }
            }
        )*
    };
}

impl_walk_sequence! {
    Vec<T> => [T: Walk],
    VecDeque<T> => [T: Walk],
    [T; N] => [T: Walk, const N: usize],
}

impl<K, V, S> Walk for HashMap<K, V, S>
where
    K: Send + Sync,
    V: Walk,
    S: BuildHasher + Send + Sync,
{
    fn shape(&self) -> Shape<'_> {
        Shape::Children(self.values().map(Child::new).collect())
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Children(self.values_mut().map(ChildMut::new).collect())
    }
}

impl<K, V> Walk for BTreeMap<K, V>
where
    K: Send + Sync,
    V: Walk,
{
    fn shape(&self) -> Shape<'_> {
        Shape::Children(self.values().map(Child::new).collect())
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Children(self.values_mut().map(ChildMut::new).collect())
    }
}

macro_rules! impl_walk_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Opaque
                }

                fn shape_mut(&mut self) -> ShapeMut<'_> {
                    ShapeMut::Opaque
                }
            }
        )*
    };
}

impl_walk_opaque!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

fn address<T>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as usize
}

impl<T: Walk> Walk for Arc<RwLock<T>> {
    fn shape(&self) -> Shape<'_> {
        Shape::Shared(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Shared(self)
    }
}

impl<T: Walk> SharedWalk for Arc<RwLock<T>> {
    fn identity(&self) -> usize {
        address(self)
    }

    fn with_read(&self, visit: &mut dyn FnMut(&dyn Walk)) {
        let guard = self.read().unwrap_or_else(PoisonError::into_inner);
        visit(&*guard);
    }

    fn with_write(&self, visit: &mut dyn FnMut(&mut dyn Walk)) {
        let mut guard = self.write().unwrap_or_else(PoisonError::into_inner);
        visit(&mut *guard);
    }
}

impl<T: Walk> Walk for Arc<Mutex<T>> {
    fn shape(&self) -> Shape<'_> {
        Shape::Shared(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Shared(self)
    }
}

impl<T: Walk> SharedWalk for Arc<Mutex<T>> {
    fn identity(&self) -> usize {
        address(self)
    }

    fn with_read(&self, visit: &mut dyn FnMut(&dyn Walk)) {
        let guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        visit(&*guard);
    }

    fn with_write(&self, visit: &mut dyn FnMut(&mut dyn Walk)) {
        let mut guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        visit(&mut *guard);
    }
}
