use std::fmt;
use std::sync::Arc;

/// Persistent stack of fragments.
///
/// Frames are immutable and linked top down, so cloning a stack and pushing
/// onto either copy never touches the fragments below. Fragments are only
/// cloned when they are popped while another stack still shares their frame.
pub struct Stack<T> {
    top: Option<Arc<Frame<T>>>,
    len: usize,
}

struct Frame<T> {
    value: T,
    below: Option<Arc<Frame<T>>>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Stack { top: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn top(&self) -> Option<&T> {
        self.top.as_deref().map(|frame| &frame.value)
    }

    /// Iterate from the top of the stack down.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.top.as_deref(),
        }
    }

    pub(crate) fn push(&mut self, value: T) {
        let below = self.top.take();
        self.top = Some(Arc::new(Frame { value, below }));
        self.len += 1;
    }
}

impl<T: Clone> Stack<T> {
    /// Fragments bottom first.
    pub fn to_vec(&self) -> Vec<T> {
        let mut values: Vec<T> = self.iter().cloned().collect();
        values.reverse();
        values
    }

    /// Remove every fragment above `len`, returning them bottom first.
    pub(crate) fn pop_to(&mut self, len: usize) -> Vec<T> {
        let mut popped = Vec::with_capacity(self.len.saturating_sub(len));
        while self.len > len {
            let frame = match self.top.take() {
                Some(frame) => frame,
                None => break,
            };
            let (value, below) = match Arc::try_unwrap(frame) {
                Ok(Frame { value, below }) => (value, below),
                Err(shared) => (shared.value.clone(), shared.below.clone()),
            };
            popped.push(value);
            self.top = below;
            self.len -= 1;
        }
        popped.reverse();
        popped
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack::new()
    }
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Stack {
            top: self.top.clone(),
            len: self.len,
        }
    }
}

// Unlink frames one at a time, a long stack would otherwise be dropped
// recursively.
impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(frame) = next {
            next = match Arc::try_unwrap(frame) {
                Ok(mut frame) => frame.below.take(),
                Err(_) => None,
            };
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'s, T> {
    next: Option<&'s Frame<T>>,
}

impl<'s, T> Iterator for Iter<'s, T> {
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.below.as_deref();
        Some(&frame.value)
    }
}
