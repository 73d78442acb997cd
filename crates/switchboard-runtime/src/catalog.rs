//! Assembles the capability registry from configuration.

use std::sync::Arc;

use switchboard_capabilities::{
    DataAnalyzer, EventLog, FeedbackBox, ImageProcessor, Journal, Notifier, PaymentProcessor,
    Reporter, ShipmentBook, ShipmentIntake, ShipmentTracker, WeatherService,
};
use switchboard_core::{BoxedCapability, Intent};
use switchboard_framework::{CapabilityRegistry, CommandSpec};
use tracing::{info, warn};

use crate::config::CapabilitiesConfig;
use crate::error::RuntimeResult;

/// Slash commands in `/help` order.
pub const COMMANDS: [CommandSpec; 10] = [
    CommandSpec::new("weather", "<город>", "погода в городе"),
    CommandSpec::new("event", "<описание>", "добавить событие"),
    CommandSpec::new("analyze", "<числа через запятую>", "среднее значение"),
    CommandSpec::new("pay", "<сумма> <пользователь>", "провести платеж"),
    CommandSpec::new("image", "<путь> [путь результата]", "изображение в оттенках серого"),
    CommandSpec::new("notify", "<текст>", "поставить уведомление в очередь"),
    CommandSpec::new("report", "", "сводка по событиям, платежам и отзывам"),
    CommandSpec::new("feedback", "<текст>", "оставить отзыв"),
    CommandSpec::new("ship", "<номер> <пункт назначения>", "зарегистрировать отправление"),
    CommandSpec::new("track", "<номер>", "статус отправления"),
];

/// Builds every capability and binds it to its intent and command.
///
/// Journals under `data_dir` are replayed so counters survive restarts.
pub async fn build_registry(config: &CapabilitiesConfig) -> RuntimeResult<CapabilityRegistry> {
    let data_dir = &config.data_dir;

    if config.weather.api_key.is_empty() {
        warn!("capabilities.weather.api_key is empty, weather requests will be rejected upstream");
    }
    let weather: BoxedCapability = Arc::new(WeatherService::new(config.weather.to_weather_config())?);
    let analysis: BoxedCapability = Arc::new(DataAnalyzer::new());
    let image: BoxedCapability = Arc::new(ImageProcessor::new(config.image_output_dir()));

    let events = Arc::new(EventLog::load(Journal::new(data_dir.join("events.jsonl"))).await?);
    let payments =
        Arc::new(PaymentProcessor::load(Journal::new(data_dir.join("payments.jsonl"))).await?);
    let feedback = Arc::new(FeedbackBox::load(Journal::new(data_dir.join("feedback.jsonl"))).await?);
    let notifier =
        Arc::new(Notifier::load(Journal::new(data_dir.join("notifications.jsonl"))).await?);

    let report: BoxedCapability = Arc::new(Reporter::new(
        Arc::clone(&events),
        Arc::clone(&payments),
        Arc::clone(&feedback),
        Arc::clone(&notifier),
    ));

    let shipments = Arc::new(ShipmentBook::new());
    let ship: BoxedCapability = Arc::new(ShipmentIntake::new(Arc::clone(&shipments)));
    let track: BoxedCapability = Arc::new(ShipmentTracker::new(shipments));

    let events: BoxedCapability = events;
    let payments: BoxedCapability = payments;
    let feedback: BoxedCapability = feedback;
    let notifier: BoxedCapability = notifier;

    let mut builder = CapabilityRegistry::builder()
        .intent(Intent::Weather, Arc::clone(&weather))
        .intent(Intent::Event, Arc::clone(&events))
        .intent(Intent::Analyze, Arc::clone(&analysis))
        .intent(Intent::Payment, Arc::clone(&payments))
        .intent(Intent::Image, Arc::clone(&image));

    // Same order as COMMANDS.
    let handlers = [
        weather, events, analysis, payments, image, notifier, report, feedback, ship, track,
    ];
    for (spec, capability) in COMMANDS.into_iter().zip(handlers) {
        builder = builder.command(spec, capability);
    }
    let registry = builder.build();

    info!(
        intents = registry.intent_count(),
        commands = registry.command_count(),
        data_dir = %data_dir.display(),
        "Capabilities ready"
    );
    Ok(registry)
}
