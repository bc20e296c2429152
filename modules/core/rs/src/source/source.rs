use dyn_clone::DynClone;
use eyre::Result;
use impl_tools::autoimpl;

/// Random-access source of records overlapping a genomic window.
///
/// A source is a cheap, cloneable description of where the records come from. Clones never share
/// the underlying handle: each clone must be opened on its own before the first `fetch`, which
/// makes it possible to hand one clone to every worker thread.
#[autoimpl(for<T: trait + ?Sized> Box<T> where Box<T>: Clone)]
pub trait Source: DynClone + Send + Sync {
    type Item;

    /// Open a private handle. Opening an already opened source is a no-op.
    fn open(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Replace the content of `into` with all records overlapping `[start, end)` on `contig`.
    fn fetch(&mut self, contig: &str, start: u64, end: u64, into: &mut Vec<Self::Item>)
        -> Result<()>;

    /// Release the handle. The source can be opened again later.
    fn close(&mut self);
}

dyn_clone::clone_trait_object!(<Item> Source<Item = Item>);
