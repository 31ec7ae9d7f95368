//! Composable, lazy transforms over streams of pages or documents.
//!
//! A [`Transform`] turns one [`Stream`] into another. Nothing is computed
//! until the caller pulls from the returned stream, so pipelines never hold
//! the whole site in intermediate collections. Errors travel inside the
//! stream and are passed through untouched by every stage.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::document::Document;
use crate::error::PipelineError;
use crate::page::Page;

/// Lazy sequence of pipeline items.
pub type Stream<'a, T> = Box<dyn Iterator<Item = Result<T, PipelineError>> + 'a>;

/// Wrap an iterator of plain items as a stream.
pub fn stream<'a, T: 'a>(items: impl IntoIterator<Item = T> + 'a) -> Stream<'a, T> {
    Box::new(items.into_iter().map(Ok))
}

pub trait Transform<T> {
    fn apply<'a>(&'a self, items: Stream<'a, T>) -> Stream<'a, T>
    where
        T: 'a;
}

/// Plain functions are 1:1 transforms applied to each item.
impl<T, F> Transform<T> for F
where
    F: Fn(T) -> T,
{
    fn apply<'a>(&'a self, items: Stream<'a, T>) -> Stream<'a, T>
    where
        T: 'a,
    {
        Box::new(items.map(move |item| item.map(self)))
    }
}

/// Ordered list of transforms applied as one.
///
/// `[t1, t2, t3]` behaves like `t3(t2(t1(items)))`. An empty group is the
/// identity. The chain is only assembled once the first item is pulled.
pub struct TransformGroup<T> {
    transforms: Vec<Box<dyn Transform<T>>>,
}

impl<T> Default for TransformGroup<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> TransformGroup<T> {
    pub fn new(transforms: Vec<Box<dyn Transform<T>>>) -> Self {
        Self { transforms }
    }

    pub fn push(&mut self, transform: impl Transform<T> + 'static) {
        self.transforms.push(Box::new(transform));
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl<T> Transform<T> for TransformGroup<T> {
    fn apply<'a>(&'a self, items: Stream<'a, T>) -> Stream<'a, T>
    where
        T: 'a,
    {
        let mut pending = Some(items);
        let mut chain: Option<Stream<'a, T>> = None;
        Box::new(std::iter::from_fn(move || {
            if let Some(items) = pending.take() {
                chain = Some(self.transforms.iter().fold(items, |items, t| t.apply(items)));
            }
            chain.as_mut()?.next()
        }))
    }
}

/// Runs a document transform over pages, keeping each page's path.
///
/// The wrapped transform must map documents 1:1 and keep their order; its
/// outputs are paired with the incoming paths positionally.
pub struct LiftPage<D> {
    inner: D,
}

impl<D: Transform<Document>> LiftPage<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: Transform<Document>> Transform<Page> for LiftPage<D> {
    fn apply<'a>(&'a self, items: Stream<'a, Page>) -> Stream<'a, Page>
    where
        Page: 'a,
    {
        // `None` marks an upstream error, which carries no page.
        let paths: Rc<RefCell<VecDeque<Option<String>>>> = Rc::default();

        let queued = Rc::clone(&paths);
        let documents: Stream<'a, Document> = Box::new(items.map(move |item| match item {
            Ok(page) => {
                queued.borrow_mut().push_back(Some(page.path));
                Ok(page.payload)
            }
            Err(e) => {
                queued.borrow_mut().push_back(None);
                Err(e)
            }
        }));

        Box::new(self.inner.apply(documents).map(move |item| {
            let path = paths.borrow_mut().pop_front().flatten();
            match (item, path) {
                (Ok(document), Some(path)) => Ok(Page::new(path, document)),
                (Ok(_), None) => Err(PipelineError::Unpaired),
                (Err(e), Some(path)) => Err(e.in_page(path)),
                (Err(e), None) => Err(e),
            }
        }))
    }
}
