use criterion::Criterion;
use light_curve_transit::{
    BatmanParameters, BatmanTransit, Model, TransitModelTrait, TrapezoidParameters,
};
use light_curve_transit_test_util::{TRANSIT_LIGHT_CURVES, iter_transit_light_curves};
use std::hint::black_box;

pub fn bench_batman(c: &mut Criterion) {
    for fixture in iter_transit_light_curves() {
        let time = fixture.light_curve.time();
        c.bench_function(&format!("Batman {} {} points", fixture.name, time.len()), |b| {
            b.iter(|| black_box(fixture.params).light_curve(black_box(time)));
        });
    }

    let params = BatmanParameters::default().into();
    let fixture = &TRANSIT_LIGHT_CURVES[0];
    for nannuli in [16, 256, 1024] {
        let model = Model::Batman(BatmanTransit::new(nannuli));
        c.bench_function(&format!("Batman {nannuli} annuli"), |b| {
            b.iter(|| model.evaluate(black_box(fixture.light_curve.time()), &params));
        });
    }
}

pub fn bench_trapezoid(c: &mut Criterion) {
    let params = TrapezoidParameters::default();
    for fixture in iter_transit_light_curves() {
        let time = fixture.light_curve.time();
        c.bench_function(&format!("Trapezoid {} points", time.len()), |b| {
            b.iter(|| black_box(params).light_curve(black_box(time)));
        });
    }
}
