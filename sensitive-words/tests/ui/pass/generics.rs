use std::{
    marker::PhantomData,
    sync::{Arc, RwLock},
};

use sensitive_words::Walk;

#[derive(Walk)]
struct Envelope<T, M> {
    payload: T,
    #[walk(ignore)]
    meta: M,
    _marker: PhantomData<M>,
}

#[derive(Walk)]
struct Node<T> {
    value: T,
    next: Option<Arc<RwLock<Node<T>>>>,
}

#[derive(Walk)]
#[walk(ignore)]
struct Opaque<T> {
    inner: T,
}

fn assert_walk<T: Walk>() {}

fn main() {
    assert_walk::<Envelope<String, u64>>();
    assert_walk::<Node<Vec<String>>>();
    assert_walk::<Opaque<u8>>();
}
