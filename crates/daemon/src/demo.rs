// Demo pizza shop components served by the daemon

use steward_infra_memory::StaticComponentSource;

/// Activity implementation instance handed to the kitchen worker
#[derive(Debug, Clone)]
pub struct KitchenActivities {
    pub ovens: u32,
}

pub fn pizza_shop() -> StaticComponentSource {
    StaticComponentSource::new()
        .with_workflow("shop::pizza::PizzaWorkflowImpl", ["PizzaWorkflow"])
        .with_workflow("shop::pizza::DeliveryWorkflowImpl", ["DeliveryWorkflow"])
        .with_activity(
            "shop::pizza::KitchenActivitiesImpl",
            ["KitchenActivities"],
            KitchenActivities { ovens: 2 },
        )
        .with_other("shop::pizza::MenuRepository")
}
