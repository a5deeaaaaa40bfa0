//! Components
//!
//! A component is a render function over its props. Mounting one creates an
//! instance whose render runs inside a reactive effect: every reactive read
//! made while rendering subscribes the instance, and a later write queues the
//! instance's update job instead of re-rendering on the spot. Writes in one
//! synchronous burst therefore cost one re-render at the next flush.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::host::HostAdapter;
use super::patch::Renderer;
use super::vnode::{Props, VNode};
use crate::reactive::{effect_with, EffectOptions, EffectRunner};
use crate::scheduler::{invalidate_job, queue_job, Job};

type RenderFn<N> = Box<dyn Fn(&Props) -> VNode<N>>;

/// A named render function.
pub struct ComponentDef<N> {
    name: Cow<'static, str>,
    render: RenderFn<N>,
}

impl<N> ComponentDef<N> {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        render: impl Fn(&Props) -> VNode<N> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            render: Box::new(render),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, props: &Props) -> VNode<N> {
        (self.render)(props)
    }
}

impl<N> fmt::Debug for ComponentDef<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef").field("name", &self.name).finish()
    }
}

/// What the reconciler needs from a mounted component, independent of the
/// host adapter type.
pub trait ComponentHandle<N> {
    fn name(&self) -> &str;

    /// First host node of the rendered subtree.
    fn first_host_node(&self) -> Option<N>;

    /// Props the last render used.
    fn props(&self) -> Props;

    /// Called when the parent re-renders. Re-renders synchronously if the
    /// props changed.
    fn update(&self, props: Props);

    /// Move the rendered subtree before `anchor`.
    fn move_to(&self, container: &N, anchor: Option<&N>);

    /// Stop the render effect and tear down the subtree.
    fn unmount(&self, do_remove: bool);

    fn is_unmounted(&self) -> bool;

    /// Number of renders so far, including the initial one.
    fn render_count(&self) -> usize;
}

/// Whether a parent re-render with `next` props must re-render the child.
pub fn should_update_component(prev: &Props, next: &Props) -> bool {
    if Rc::ptr_eq(prev, next) {
        return false;
    }
    if prev.len() != next.len() {
        return true;
    }
    next.iter().any(|(key, value)| prev.get(key) != Some(value))
}

struct ComponentInstance<A: HostAdapter> {
    def: Rc<ComponentDef<A::Node>>,
    renderer: Renderer<A>,
    props: RefCell<Props>,
    sub_tree: RefCell<Option<VNode<A::Node>>>,
    container: RefCell<A::Node>,
    anchor: Option<A::Node>,
    runner: RefCell<Option<EffectRunner>>,
    job: RefCell<Option<Job>>,
    unmounted: Cell<bool>,
    render_count: Cell<usize>,
}

impl<A: HostAdapter + 'static> ComponentInstance<A> {
    /// Effect body: render and patch against the previous subtree.
    fn render_and_patch(&self) {
        if self.unmounted.get() {
            return;
        }
        let props = self.props.borrow().clone();
        let mut next = self.def.render(&props);
        let prev = self.sub_tree.borrow_mut().take();
        let container = self.container.borrow().clone();

        self.renderer
            .patch(prev.as_ref(), &mut next, &container, self.anchor.as_ref());

        *self.sub_tree.borrow_mut() = Some(next);
        self.render_count.set(self.render_count.get() + 1);
        tracing::trace!(
            component = %self.def.name(),
            renders = self.render_count.get(),
            "component rendered"
        );
    }

    fn run_update(&self) {
        if self.unmounted.get() {
            return;
        }
        let runner = self.runner.borrow().clone();
        if let Some(runner) = runner {
            runner.run();
        }
    }
}

impl<A: HostAdapter + 'static> ComponentHandle<A::Node> for ComponentInstance<A> {
    fn name(&self) -> &str {
        self.def.name()
    }

    fn first_host_node(&self) -> Option<A::Node> {
        self.sub_tree
            .borrow()
            .as_ref()
            .and_then(|tree| tree.first_host_node())
    }

    fn props(&self) -> Props {
        self.props.borrow().clone()
    }

    fn update(&self, props: Props) {
        let changed = should_update_component(&self.props.borrow(), &props);
        if !changed {
            return;
        }
        *self.props.borrow_mut() = props;
        // The render happening now makes a queued one redundant.
        if let Some(job) = self.job.borrow().as_ref() {
            invalidate_job(job.id());
        }
        self.run_update();
    }

    fn move_to(&self, container: &A::Node, anchor: Option<&A::Node>) {
        *self.container.borrow_mut() = container.clone();
        if let Some(tree) = self.sub_tree.borrow().as_ref() {
            self.renderer.move_vnode(tree, container, anchor);
        }
    }

    fn unmount(&self, do_remove: bool) {
        if self.unmounted.replace(true) {
            return;
        }
        let runner = self.runner.borrow_mut().take();
        if let Some(runner) = runner {
            runner.stop();
        }
        let job = self.job.borrow_mut().take();
        if let Some(job) = job {
            invalidate_job(job.id());
        }
        let tree = self.sub_tree.borrow_mut().take();
        if let Some(tree) = tree {
            self.renderer.unmount(&tree, do_remove);
        }
        tracing::trace!(component = %self.def.name(), "component unmounted");
    }

    fn is_unmounted(&self) -> bool {
        self.unmounted.get()
    }

    fn render_count(&self) -> usize {
        self.render_count.get()
    }
}

/// Create an instance, run its first render into `container` and return the
/// handle the owning node keeps.
pub(crate) fn mount_component<A: HostAdapter + 'static>(
    renderer: &Renderer<A>,
    def: Rc<ComponentDef<A::Node>>,
    props: Props,
    container: &A::Node,
    anchor: Option<&A::Node>,
) -> Rc<dyn ComponentHandle<A::Node>> {
    let instance = Rc::new(ComponentInstance {
        def,
        renderer: renderer.clone(),
        props: RefCell::new(props),
        sub_tree: RefCell::new(None),
        container: RefCell::new(container.clone()),
        anchor: anchor.cloned(),
        runner: RefCell::new(None),
        job: RefCell::new(None),
        unmounted: Cell::new(false),
        render_count: Cell::new(0),
    });

    // Closures hold the instance weakly; the owning node keeps it alive.
    let weak: Weak<ComponentInstance<A>> = Rc::downgrade(&instance);
    let job = Job::new({
        let weak = weak.clone();
        move || {
            if let Some(instance) = weak.upgrade() {
                instance.run_update();
            }
        }
    });
    *instance.job.borrow_mut() = Some(job.clone());

    let runner = effect_with(
        move || {
            if let Some(instance) = weak.upgrade() {
                instance.render_and_patch();
            }
        },
        EffectOptions::default()
            .scheduler(move || queue_job(job.clone()))
            .lazy(),
    );
    *instance.runner.borrow_mut() = Some(runner.clone());
    runner.run();

    instance
}
